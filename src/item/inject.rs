//! Item Injection
//!
//! Materializes registered items into the host item table by cloning a base
//! record, rewriting its fields, and inserting the clone under the entry's
//! numeric id. Runs any number of times; entries already present are skipped.

use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::config::IdRanges;
use crate::effect::canonical_parameter;
use crate::error::InjectError;
use crate::host::{
    fields, lists, ContentTable, FieldValue, HostTables, ItemRecord, ItemVariant, ListEntry,
    NumericId,
};
use crate::markers::{CustomKind, CustomMarkers};
use crate::registry::InjectReport;

use super::definition::{ItemDefinition, ItemKind, DEFAULT_PRICE, DEFAULT_WEIGHT};
use super::registry::{ItemRegistry, RegisteredItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Injected,
    /// Inserted, icon copy still pending
    Deferred,
    Patched,
    /// Already present or nothing to change
    Skipped,
}

pub struct ItemInjector {
    ids: IdRanges,
    /// Deferred icon copies: injected item -> item whose icon it borrows
    pending_icons: BTreeMap<NumericId, NumericId>,
}

impl ItemInjector {
    pub fn new(ids: IdRanges) -> Self {
        Self {
            ids,
            pending_icons: BTreeMap::new(),
        }
    }

    /// String-table key of the item title; the description uses the next key.
    pub fn title_key(&self, numeric_id: NumericId) -> u32 {
        self.ids.string_key_base + numeric_id.saturating_sub(self.ids.item_base) * 2
    }

    pub fn pending_icon_count(&self) -> usize {
        self.pending_icons.len()
    }

    pub fn is_icon_pending(&self, id: NumericId) -> bool {
        self.pending_icons.contains_key(&id)
    }

    /// Inject every registered item, in registration order.
    ///
    /// Only an unready table aborts the pass; a failing entry is logged and
    /// counted, and the remaining entries still run.
    pub fn inject_all<I: ItemRecord, R>(
        &mut self,
        registry: &mut ItemRegistry,
        tables: &mut HostTables<'_, I, R>,
        markers: &mut CustomMarkers,
    ) -> Result<InjectReport, InjectError> {
        if !tables.items.is_ready() {
            warn!("Item table not ready, injection postponed");
            return Err(InjectError::TableNotReady(tables.items.name()));
        }

        info!("Injecting {} item(s)", registry.len());
        let mut report = InjectReport::default();

        for entry in registry.iter_mut() {
            match self.inject_entry(entry, tables, markers) {
                Ok(Outcome::Injected) => report.injected += 1,
                Ok(Outcome::Deferred) => {
                    report.injected += 1;
                    report.deferred += 1;
                }
                Ok(Outcome::Patched) => report.patched += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    error!("Failed to inject item '{}': {}", entry.key, e);
                    report.failed += 1;
                }
            }
        }

        info!("Items: {}", report);
        Ok(report)
    }

    fn inject_entry<I: ItemRecord, R>(
        &mut self,
        entry: &mut RegisteredItem,
        tables: &mut HostTables<'_, I, R>,
        markers: &mut CustomMarkers,
    ) -> Result<Outcome, InjectError> {
        if entry.is_patch() {
            return patch_existing(entry, &mut *tables.items);
        }

        let id = entry.numeric_id;
        if tables.items.contains(id) {
            entry.set_materialized(id);
            return Ok(Outcome::Skipped);
        }

        let def = &entry.definition;
        let base = tables
            .items
            .get(def.base_item)
            .ok_or_else(|| InjectError::BaseMissing {
                entry: entry.key.clone(),
                base: def.base_item,
            })?;

        // Nested lists of the clone may still belong to the base record.
        let mut record = base.clone_record();
        let variant = record.variant();
        let title_key = self.title_key(id);

        record.set_field(fields::ID, FieldValue::Id(id))?;
        record.set_field(fields::TITLE_KEY, FieldValue::Int(title_key as i64))?;
        record.set_field(fields::DESCRIPTION_KEY, FieldValue::Int(title_key as i64 + 1))?;
        record.set_field(fields::PRICE, FieldValue::Int(def.price))?;
        record.set_field(fields::WEIGHT, FieldValue::Float(def.weight))?;
        record.set_field(fields::RARE_COLOR, FieldValue::Int(def.rare_color))?;
        record.set_field(fields::SELLABLE, FieldValue::Bool(def.sellable))?;
        record.set_field(fields::NOT_FOR_FIRE, FieldValue::Bool(def.not_for_fire))?;
        record.set_field(fields::SOUND_TYPE, FieldValue::Int(def.sound_type))?;
        record.set_field(fields::FIRE_RATE, FieldValue::Int(def.firerate))?;

        if matches!(variant, ItemVariant::Consumable | ItemVariant::Scrap) {
            record.set_field(fields::STOCKABLE, FieldValue::Bool(def.is_stockable))?;
            record.set_field(fields::STOCK_COUNT, FieldValue::Int(def.actual_stock_count))?;
        }

        let mut icon_pending = false;
        if def.reference_item_id > 0 {
            match reference_icon(&*tables.items, def.reference_item_id) {
                Some(icon) => record.set_field(fields::ICON, icon)?,
                None => icon_pending = true,
            }
        } else if !def.icon.is_empty() {
            let path = entry.package.dir.join(&def.icon);
            record.set_field(
                fields::ICON,
                FieldValue::Asset(path.to_string_lossy().into_owned()),
            )?;
        }

        apply_kind_fields(def, variant, id, &mut record, markers)?;

        let name = entry.resolve_text(&def.name);
        let description = entry.resolve_text(&def.description);
        tables.strings.set_string(title_key, name);
        tables.strings.set_string(title_key + 1, description);

        tables.items.set(id, record);

        let outcome = if icon_pending {
            self.pending_icons.insert(id, def.reference_item_id);
            debug!(
                "Icon of {} not available yet, deferring copy for {}",
                def.reference_item_id, entry.key
            );
            Outcome::Deferred
        } else {
            info!("Injected item {} ({})", entry.key, id);
            Outcome::Injected
        };

        entry.set_materialized(id);
        Ok(outcome)
    }

    /// Copy a deferred icon if its source is now available. Unresolved
    /// entries are left untouched.
    pub fn retry_deferred<I, T>(&mut self, id: NumericId, items: &mut T) -> bool
    where
        I: ItemRecord,
        T: ContentTable<I> + ?Sized,
    {
        let Some(&reference) = self.pending_icons.get(&id) else {
            return false;
        };
        if !items.contains(id) {
            return false;
        }
        let Some(icon) = reference_icon(&*items, reference) else {
            return false;
        };
        let Some(record) = items.get_mut(id) else {
            return false;
        };

        match record.set_field(fields::ICON, icon) {
            Ok(()) => {
                self.pending_icons.remove(&id);
                info!("Copied deferred icon from {} to {}", reference, id);
                true
            }
            Err(e) => {
                warn!("Deferred icon copy for {} failed: {}", id, e);
                false
            }
        }
    }

    /// Retry every pending icon copy. Returns how many were resolved.
    pub fn retry_all_deferred<I, T>(&mut self, items: &mut T) -> usize
    where
        I: ItemRecord,
        T: ContentTable<I> + ?Sized,
    {
        let pending: Vec<NumericId> = self.pending_icons.keys().copied().collect();
        let mut resolved = 0;
        for id in pending {
            if self.retry_deferred(id, &mut *items) {
                resolved += 1;
            }
        }

        if resolved > 0 && self.pending_icons.is_empty() {
            info!("All deferred icons resolved");
        }
        resolved
    }
}

fn reference_icon<I, T>(items: &T, reference: NumericId) -> Option<FieldValue>
where
    I: ItemRecord,
    T: ContentTable<I> + ?Sized,
{
    items.get(reference)?.field(fields::ICON)
}

/// Kind-specific fields, written only when the definition's type and the
/// cloned record's variant agree.
fn apply_kind_fields<I: ItemRecord>(
    def: &ItemDefinition,
    variant: ItemVariant,
    id: NumericId,
    record: &mut I,
    markers: &mut CustomMarkers,
) -> Result<(), InjectError> {
    match (def.kind, variant) {
        (ItemKind::Consumable, ItemVariant::Consumable) => {
            record.replace_list(lists::CHANGES)?;
            record.replace_list(lists::BUFF_CHANGES)?;
            record.replace_list(lists::PARAMETER_CHANGES)?;
        }
        (ItemKind::Gear, ItemVariant::Gear) => {
            let category = def.gear_category().as_str().to_string();
            record.set_field(fields::CATEGORY, FieldValue::Text(category))?;
            record.set_field(fields::WARM_RESISTANCE, FieldValue::Int(def.warm_resistance))?;
            record.set_field(fields::WET_RESISTANCE, FieldValue::Int(def.wet_resistance))?;
            record.set_field(
                fields::DURABILITY_RESISTANCE,
                FieldValue::Int(def.durability_resistance),
            )?;

            record.replace_list(lists::PARAMETER_CHANGES)?;
            for bonus in &def.stats {
                match canonical_parameter(&bonus.stat) {
                    Some(stat) => record.push_entry(
                        lists::PARAMETER_CHANGES,
                        ListEntry::Parameter {
                            stat: stat.to_string(),
                            value: bonus.value,
                        },
                    )?,
                    None => warn!("Unknown gear stat '{}' on {}, skipped", bonus.stat, def.id),
                }
            }
        }
        (ItemKind::Weapon, ItemVariant::Weapon) => {
            record.set_field(fields::ATTACK, FieldValue::Int(def.attack))?;
            record.set_field(fields::DEFENSE, FieldValue::Int(def.defense))?;
            record.set_field(fields::CRITICAL_CHANCE, FieldValue::Int(def.critical_chance))?;
            record.set_field(fields::MAX_DURABILITY, FieldValue::Int(def.max_durability))?;
            record.set_field(fields::ACTUAL_DURABILITY, FieldValue::Int(def.max_durability))?;
        }
        (ItemKind::Bag, ItemVariant::Bag) => {
            if def.bag_capacity > 0.0 {
                record.set_field(fields::CAPACITY, FieldValue::Float(def.bag_capacity))?;
            }
            markers.mark(CustomKind::Bag, id);
        }
        (ItemKind::Other, _) => {}
        (kind, variant) => {
            debug!(
                "Item {} declares {:?} but base record is {:?}; kind fields skipped",
                def.id, kind, variant
            );
        }
    }
    Ok(())
}

/// Patch an existing host record in place, writing only what
/// [`patch_writes`] reports as still pending.
fn patch_existing<I: ItemRecord>(
    entry: &mut RegisteredItem,
    items: &mut dyn ContentTable<I>,
) -> Result<Outcome, InjectError> {
    let target = entry.definition.target_item_id;
    let writes = patch_writes::<I, _>(&entry.definition, &*items).ok_or_else(|| {
        InjectError::TargetMissing {
            entry: entry.key.clone(),
            target,
        }
    })?;

    if writes.is_empty() {
        entry.set_materialized(target);
        return Ok(Outcome::Skipped);
    }

    let record = items.get_mut(target).ok_or_else(|| InjectError::TargetMissing {
        entry: entry.key.clone(),
        target,
    })?;
    for (name, value) in writes {
        record.set_field(name, value)?;
    }

    entry.set_materialized(target);
    info!("Patched existing item {} for {}", target, entry.key);
    Ok(Outcome::Patched)
}

/// Field writes a patch still needs. Only fields that differ from their
/// documented defaults are considered (sellable and not-for-fire always),
/// minus those the target already holds. `None` if the target is missing.
fn patch_writes<I, T>(
    def: &ItemDefinition,
    items: &T,
) -> Option<Vec<(&'static str, FieldValue)>>
where
    I: ItemRecord,
    T: ContentTable<I> + ?Sized,
{
    let current = items.get(def.target_item_id)?;

    let mut writes: Vec<(&'static str, FieldValue)> = Vec::new();
    if def.price != DEFAULT_PRICE {
        writes.push((fields::PRICE, FieldValue::Int(def.price)));
    }
    if (def.weight - DEFAULT_WEIGHT).abs() > f64::EPSILON {
        writes.push((fields::WEIGHT, FieldValue::Float(def.weight)));
    }
    if def.rare_color != 0 {
        writes.push((fields::RARE_COLOR, FieldValue::Int(def.rare_color)));
    }
    writes.push((fields::SELLABLE, FieldValue::Bool(def.sellable)));
    writes.push((fields::NOT_FOR_FIRE, FieldValue::Bool(def.not_for_fire)));
    if def.sound_type != 0 {
        writes.push((fields::SOUND_TYPE, FieldValue::Int(def.sound_type)));
    }
    if def.firerate != 0 {
        writes.push((fields::FIRE_RATE, FieldValue::Int(def.firerate)));
    }
    if def.reference_item_id > 0 {
        if let Some(icon) = reference_icon(items, def.reference_item_id) {
            writes.push((fields::ICON, icon));
        }
    }

    writes.retain(|(name, value)| current.field(name).as_ref() != Some(value));
    Some(writes)
}

/// True when some patch entry's target no longer holds its patched values,
/// as after the host rebuilt the table from its own data. Missing targets
/// do not count; patching them fails anyway.
pub fn patches_outdated<I, T>(registry: &ItemRegistry, items: &T) -> bool
where
    I: ItemRecord,
    T: ContentTable<I> + ?Sized,
{
    registry
        .iter()
        .filter(|entry| entry.is_patch())
        .any(|entry| {
            patch_writes::<I, T>(&entry.definition, items).is_some_and(|writes| !writes.is_empty())
        })
}
