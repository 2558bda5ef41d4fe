use eyre::{bail, Result};
use uuid::Uuid;

use crate::graph::{Executor, Input};
use crate::persist::{decode_str, encode_to_string, PinValue, SlotKind, SlotRecord};

/// A dynamic input of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub uuid: Uuid,
    pub kind: SlotKind,
    pub input: Input,
}

/// Dynamic inputs in creation order, addressed by name.
///
/// Each slot keeps a `Uuid` for its whole life, including across save and
/// reload; renaming a slot does not change it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotMap {
    slots: Vec<Slot>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, kind: SlotKind, input: Input) -> Result<Uuid> {
        let name = name.into();
        if self.get(&name).is_some() {
            bail!("slot '{}' already exists", name);
        }
        let uuid = Uuid::new_v4();
        self.slots.push(Slot {
            name,
            uuid,
            kind,
            input,
        });
        Ok(uuid)
    }

    pub fn remove(&mut self, name: &str) -> Option<Slot> {
        let pos = self.slots.iter().position(|s| s.name == name)?;
        Some(self.slots.remove(pos))
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        if self.get(to).is_some() {
            bail!("slot '{}' already exists", to);
        }
        match self.slots.iter_mut().find(|s| s.name == from) {
            Some(slot) => {
                slot.name = to.to_string();
                Ok(())
            }
            None => bail!("no slot named '{}'", from),
        }
    }

    pub fn set_input(&mut self, name: &str, input: Input) -> Result<()> {
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) => {
                slot.input = input;
                Ok(())
            }
            None => bail!("no slot named '{}'", name),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current values of the slots of one kind, in slot order.
    pub fn values(&self, kind: SlotKind, exec: &Executor<'_>) -> Vec<(String, PinValue)> {
        self.slots
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| (s.name.clone(), exec.input(&s.input)))
            .collect()
    }

    /// Saved form. `pin_index` starts at `first_index` so it can follow a
    /// node's fixed inputs. Linked slots save a null value; links belong to
    /// the graph.
    pub fn to_records(&self, first_index: usize) -> Vec<SlotRecord> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| SlotRecord {
                name: slot.name.clone(),
                uuid: slot.uuid,
                kind: slot.kind,
                pin_index: first_index + i,
                value: match &slot.input {
                    Input::Value(value) => encode_to_string(value),
                    Input::Link(_) => encode_to_string(&PinValue::Null),
                },
            })
            .collect()
    }

    /// Restores slots in `pin_index` order with their saved uuids. A value
    /// that can't be decoded restores as null.
    pub fn from_records(mut records: Vec<SlotRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.pin_index);
        let mut map = SlotMap::new();
        for record in records {
            if map.get(&record.name).is_some() {
                bail!("slot '{}' saved twice", record.name);
            }
            map.slots.push(Slot {
                input: Input::Value(decode_str(&record.value)),
                name: record.name,
                uuid: record.uuid,
                kind: record.kind,
            });
        }
        Ok(map)
    }
}
