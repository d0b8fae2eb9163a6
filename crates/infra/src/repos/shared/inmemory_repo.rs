use renewal_reminders_domain::{Entity, ID};
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> anyhow::Result<()> {
    let mut collection = collection.lock().map_err(poisoned)?;
    if collection.iter().any(|item| item.id() == val.id()) {
        return Err(anyhow::anyhow!("Entity with id: {} already exists", val.id()));
    }
    collection.push(val.clone());
    Ok(())
}

/// Replaces the whole stored value, like a single document update would
pub fn save<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> anyhow::Result<()> {
    let mut collection = collection.lock().map_err(poisoned)?;
    match collection.iter_mut().find(|item| item.id() == val.id()) {
        Some(item) => {
            *item = val.clone();
            Ok(())
        }
        None => Err(anyhow::anyhow!("Entity with id: {} was not found", val.id())),
    }
}

/// Applies `update` to the stored value in place, other fields are left as they are
pub fn update<T: Entity, F: FnOnce(&mut T)>(
    val_id: &ID,
    collection: &Mutex<Vec<T>>,
    update: F,
) -> anyhow::Result<()> {
    let mut collection = collection.lock().map_err(poisoned)?;
    match collection.iter_mut().find(|item| item.id() == val_id) {
        Some(item) => {
            update(item);
            Ok(())
        }
        None => Err(anyhow::anyhow!("Entity with id: {} was not found", val_id)),
    }
}

pub fn find<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = collection.lock().ok()?;
    collection.iter().find(|item| item.id() == val_id).cloned()
}

pub fn find_by<T: Clone + Entity, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> Vec<T> {
    let collection = match collection.lock() {
        Ok(collection) => collection,
        Err(_) => return Vec::new(),
    };
    collection
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

pub fn delete<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let mut collection = collection.lock().ok()?;
    let index = collection.iter().position(|item| item.id() == val_id)?;
    Some(collection.remove(index))
}

fn poisoned<E>(_: E) -> anyhow::Error {
    anyhow::anyhow!("Inmemory collection lock was poisoned")
}
