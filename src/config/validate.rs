// src/config/validate.rs

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::capacity::MAX_LOOKAHEAD_DAYS;
use crate::config::model::{
    AvailabilityEntry, ConfigSection, ItemConfig, RawShopFile, ResourceConfig, ShopFile,
};
use crate::errors::{Result, SchedError, ValidationError};
use crate::graph::{validate_item, validate_references};
use crate::model::{ResourceId, ResourceProfile, WorkItem};
use crate::sla::{validate_policy, validate_single_default, SlaPolicy};

impl TryFrom<RawShopFile> for ShopFile {
    type Error = crate::errors::SchedError;

    fn try_from(raw: RawShopFile) -> std::result::Result<Self, Self::Error> {
        let workday_start = validate_global_config(&raw.config)?;
        let resources = build_resources(&raw.resource)?;
        let availability = build_availability(&raw.availability, &raw.resource)?;
        let items = build_items(&raw.item, &raw.resource)?;
        let policies = build_policies(raw.policy)?;

        Ok(ShopFile::new_unchecked(
            raw.config,
            workday_start,
            resources,
            availability,
            items,
            policies,
        ))
    }
}

fn validate_global_config(cfg: &ConfigSection) -> Result<NaiveTime> {
    if cfg.lookahead_days == 0 {
        return Err(SchedError::ConfigError(
            "[config].lookahead_days must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.lookahead_days > MAX_LOOKAHEAD_DAYS {
        return Err(SchedError::ConfigError(format!(
            "[config].lookahead_days must be <= {MAX_LOOKAHEAD_DAYS} (got {})",
            cfg.lookahead_days
        )));
    }

    if cfg.queue_length == 0 {
        return Err(SchedError::ConfigError(
            "[config].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.reconcile_interval_secs == 0 {
        return Err(SchedError::ConfigError(
            "[config].reconcile_interval_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    parse_time(&cfg.workday_start, "[config].workday_start")
}

fn build_resources(raw: &BTreeMap<String, ResourceConfig>) -> Result<Vec<ResourceProfile>> {
    let mut out = Vec::with_capacity(raw.len());

    for (id, res) in raw {
        let workday_start = match res.workday_start.as_deref() {
            Some(s) => Some(parse_time(s, &format!("resource '{id}' workday_start"))?),
            None => None,
        };
        out.push(ResourceProfile {
            id: id.clone(),
            name: res.name.clone(),
            workday_start,
        });
    }

    Ok(out)
}

fn build_availability(
    entries: &[AvailabilityEntry],
    resources: &BTreeMap<String, ResourceConfig>,
) -> Result<Vec<(ResourceId, NaiveDate, i64)>> {
    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        if !resources.contains_key(&entry.resource) {
            return Err(SchedError::ConfigError(format!(
                "availability entry for {} references unknown resource '{}'",
                entry.date, entry.resource
            )));
        }
        if entry.minutes < 0 {
            return Err(SchedError::ConfigError(format!(
                "availability for '{}' on {} must be >= 0 minutes (got {})",
                entry.resource, entry.date, entry.minutes
            )));
        }
        let date = NaiveDate::parse_from_str(entry.date.trim(), "%Y-%m-%d").map_err(|e| {
            SchedError::ConfigError(format!(
                "availability for '{}': invalid date '{}': {e}",
                entry.resource, entry.date
            ))
        })?;
        out.push((entry.resource.clone(), date, entry.minutes));
    }

    Ok(out)
}

fn build_items(
    raw: &BTreeMap<String, ItemConfig>,
    resources: &BTreeMap<String, ResourceConfig>,
) -> Result<Vec<WorkItem>> {
    let mut items = Vec::with_capacity(raw.len());

    for (id, cfg) in raw {
        let mut item = WorkItem::new(id.clone(), cfg.subject.clone().unwrap_or_else(|| id.clone()));
        item.status = cfg.status;
        item.priority = cfg.priority;
        item.sequence = cfg.sequence;
        item.progress = cfg.progress;
        item.planned_effort_minutes = cfg.planned_effort_minutes;
        item.assigned_resource = cfg.assigned_resource.clone();
        item.parent = cfg.parent.clone();
        item.predecessors = cfg.after.clone();
        item.scheduled_start = parse_optional_datetime(id, "scheduled_start", &cfg.scheduled_start)?;
        item.expected_start = parse_optional_datetime(id, "expected_start", &cfg.expected_start)?;
        item.expected_end = parse_optional_datetime(id, "expected_end", &cfg.expected_end)?;

        if let Some(resource) = &item.assigned_resource {
            if !resources.contains_key(resource) {
                return Err(ValidationError::DanglingResource {
                    item: item.id.clone(),
                    resource: resource.clone(),
                }
                .into());
            }
        }

        validate_item(&item)?;
        items.push(item);
    }

    validate_references(&items)?;
    Ok(items)
}

fn build_policies(raw: BTreeMap<String, SlaPolicy>) -> Result<Vec<SlaPolicy>> {
    let policies: Vec<SlaPolicy> = raw
        .into_iter()
        .map(|(name, mut policy)| {
            policy.name = name;
            policy
        })
        .collect();

    for policy in &policies {
        validate_policy(policy)?;
    }
    validate_single_default(&policies)?;

    Ok(policies)
}

fn parse_time(s: &str, what: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| SchedError::ConfigError(format!("{what}: invalid time '{s}' (expected HH:MM)")))
}

fn parse_optional_datetime(
    item: &str,
    field: &str,
    value: &Option<String>,
) -> Result<Option<NaiveDateTime>> {
    let Some(s) = value.as_deref() else {
        return Ok(None);
    };
    let s = s.trim();

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(Some)
        .ok_or_else(|| {
            SchedError::ConfigError(format!(
                "item '{item}': invalid {field} '{s}' (expected YYYY-MM-DDTHH:MM[:SS])"
            ))
        })
}
