//! Weapon templates and the catalog that serves them by key.
//!
//! Templates are validated once when registered. The simulation only ever
//! sees well-formed [`WeaponTemplate`] values; unknown keys resolve to the
//! unarmed fallback instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::*;
use crate::enums::{FireMode, WeaponClass};

/// Immutable weapon stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub key: String,
    pub name: String,
    pub class: WeaponClass,
    pub damage: f64,
    /// Maximum projectile travel distance (world units).
    pub range: f64,
    pub fire_interval_ms: f64,
    pub magazine_size: u32,
    pub reload_ms: f64,
    /// Full spread cone in degrees.
    pub spread_deg: f64,
    /// Projectiles per accepted semi/auto shot.
    pub projectile_count: u32,
    pub fire_mode: FireMode,
    pub burst_count: u32,
    pub burst_interval_ms: f64,
    pub color: String,
}

impl WeaponTemplate {
    /// Fallback for unknown keys: never fires, never finishes reloading.
    pub fn unarmed(key: &str) -> Self {
        Self {
            key: key.to_string(),
            name: "Unarmed".to_string(),
            class: WeaponClass::Pistol,
            damage: 0.0,
            range: 0.0,
            fire_interval_ms: f64::INFINITY,
            magazine_size: 0,
            reload_ms: f64::INFINITY,
            spread_deg: 0.0,
            projectile_count: 0,
            fire_mode: FireMode::Semi,
            burst_count: 0,
            burst_interval_ms: DEFAULT_BURST_INTERVAL_MS,
            color: "#ffffff".to_string(),
        }
    }

    pub fn is_unarmed(&self) -> bool {
        self.magazine_size == 0
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("weapon template `{key}` is not valid JSON: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("weapon template `{key}` failed validation: {}", errors.join("; "))]
    Invalid { key: String, errors: Vec<String> },
}

/// Template provider keyed by identifier. Ordered so random picks are
/// reproducible for a given seed.
#[derive(Debug, Clone, Default)]
pub struct WeaponCatalog {
    templates: BTreeMap<String, WeaponTemplate>,
}

impl WeaponCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock arsenal: pistol, shotgun, mp, rifle and a burst carbine.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(stock(
            "pistol",
            "Pistol",
            WeaponClass::Pistol,
            StockStats {
                damage: 1.0,
                range_tiles: 4.0,
                fire_interval_ms: 400.0,
                magazine_size: 8,
                reload_ms: 2000.0,
                spread_deg: 0.0,
                projectile_count: 1,
                fire_mode: FireMode::Semi,
                color: "#ffff00",
            },
        ));
        catalog.insert(stock(
            "shotgun",
            "Shotgun",
            WeaponClass::Shotgun,
            StockStats {
                damage: 1.0,
                range_tiles: 3.5,
                fire_interval_ms: 1000.0,
                magazine_size: 2,
                reload_ms: 5000.0,
                spread_deg: 20.0,
                projectile_count: 5,
                fire_mode: FireMode::Semi,
                color: "#ffaa00",
            },
        ));
        catalog.insert(stock(
            "mp",
            "Machine Pistol",
            WeaponClass::Mp,
            StockStats {
                damage: 0.5,
                range_tiles: 6.0,
                fire_interval_ms: 100.0,
                magazine_size: 30,
                reload_ms: 3000.0,
                spread_deg: 5.0,
                projectile_count: 1,
                fire_mode: FireMode::Auto,
                color: "#ffff00",
            },
        ));
        catalog.insert(stock(
            "rifle",
            "Rifle",
            WeaponClass::Rifle,
            StockStats {
                damage: 2.0,
                range_tiles: 15.0,
                fire_interval_ms: 800.0,
                magazine_size: 5,
                reload_ms: 5000.0,
                spread_deg: 2.0,
                projectile_count: 1,
                fire_mode: FireMode::Semi,
                color: "#ffffff",
            },
        ));
        catalog.insert(stock(
            "carbine",
            "Burst Carbine",
            WeaponClass::Rifle,
            StockStats {
                damage: 1.0,
                range_tiles: 10.0,
                fire_interval_ms: 500.0,
                magazine_size: 30,
                reload_ms: 3000.0,
                spread_deg: 3.0,
                projectile_count: 1,
                fire_mode: FireMode::Burst,
                color: "#aaffaa",
            },
        ));
        catalog
    }

    /// Add or replace a template under its own key.
    pub fn insert(&mut self, template: WeaponTemplate) {
        self.templates.insert(template.key.clone(), template);
    }

    /// Parse, validate and register an external template document.
    pub fn register_json(&mut self, key: &str, text: &str) -> Result<(), CatalogError> {
        let doc: Value = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
            key: key.to_string(),
            source,
        })?;
        let template = parse_document(key, &doc)?;
        self.insert(template);
        Ok(())
    }

    /// Look up a template, falling back to unarmed for unknown keys.
    pub fn get(&self, key: &str) -> WeaponTemplate {
        match self.templates.get(key) {
            Some(template) => template.clone(),
            None => {
                log::warn!("unknown weapon template `{key}`, issuing unarmed fallback");
                WeaponTemplate::unarmed(key)
            }
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&WeaponTemplate> {
        self.templates.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// All registered keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn keys_of_class(&self, class: WeaponClass) -> Vec<&str> {
        self.templates
            .values()
            .filter(|t| t.class == class)
            .map(|t| t.key.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

struct StockStats {
    damage: f64,
    range_tiles: f64,
    fire_interval_ms: f64,
    magazine_size: u32,
    reload_ms: f64,
    spread_deg: f64,
    projectile_count: u32,
    fire_mode: FireMode,
    color: &'static str,
}

fn stock(key: &str, name: &str, class: WeaponClass, stats: StockStats) -> WeaponTemplate {
    let burst_count = if stats.fire_mode == FireMode::Burst {
        DEFAULT_BURST_COUNT
    } else {
        0
    };
    WeaponTemplate {
        key: key.to_string(),
        name: name.to_string(),
        class,
        damage: stats.damage,
        range: stats.range_tiles * TILE_SIZE,
        fire_interval_ms: stats.fire_interval_ms,
        magazine_size: stats.magazine_size,
        reload_ms: stats.reload_ms,
        spread_deg: stats.spread_deg,
        projectile_count: stats.projectile_count,
        fire_mode: stats.fire_mode,
        burst_count,
        burst_interval_ms: DEFAULT_BURST_INTERVAL_MS,
        color: stats.color.to_string(),
    }
}

/// Map the family names used by template authors onto [`WeaponClass`].
pub fn class_from_alias(name: &str) -> Option<WeaponClass> {
    match name.to_ascii_lowercase().as_str() {
        "pistol" | "handgun" => Some(WeaponClass::Pistol),
        "mp" | "machinepistol" | "smg" => Some(WeaponClass::Mp),
        "rifle" | "carbine" => Some(WeaponClass::Rifle),
        "shotgun" => Some(WeaponClass::Shotgun),
        _ => None,
    }
}

fn fire_mode_from_name(name: &str) -> Option<FireMode> {
    match name.to_ascii_lowercase().as_str() {
        "semi" | "semi-auto" => Some(FireMode::Semi),
        "auto" => Some(FireMode::Auto),
        "3-burst" => Some(FireMode::Burst),
        _ => None,
    }
}

/// Validate a raw template document. Every problem is reported, not just the first.
/// `attributes.range` is in tiles; times are in milliseconds.
fn parse_document(key: &str, doc: &Value) -> Result<WeaponTemplate, CatalogError> {
    let mut errors = Vec::new();

    if !doc.is_object() {
        return Err(CatalogError::Invalid {
            key: key.to_string(),
            errors: vec!["root must be object".to_string()],
        });
    }

    let name = doc.get("name").and_then(Value::as_str);
    if name.is_none() {
        errors.push("name (string) required".to_string());
    }

    let class = match doc.get("weaponType").and_then(Value::as_str) {
        Some(raw) => {
            let class = class_from_alias(raw);
            if class.is_none() {
                errors.push(format!("weaponType '{raw}' is not a known class"));
            }
            class
        }
        None => {
            errors.push("weaponType (string) required".to_string());
            None
        }
    };

    let attrs = doc.get("attributes").filter(|a| a.is_object());
    if attrs.is_none() {
        errors.push("attributes (object) required".to_string());
    }

    let number = |field: &str, errors: &mut Vec<String>| -> Option<f64> {
        let value = attrs?.get(field).and_then(Value::as_f64);
        match value {
            Some(v) if v.is_finite() && v >= 0.0 => Some(v),
            Some(_) => {
                errors.push(format!("attributes.{field} must be a non-negative number"));
                None
            }
            None => {
                errors.push(format!("attributes.{field} must be number"));
                None
            }
        }
    };
    let optional = |field: &str| -> Option<f64> {
        attrs
            .and_then(|a| a.get(field))
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v >= 0.0)
    };

    let (fire_interval_ms, damage, capacity, reload_ms, range_tiles) = if attrs.is_some() {
        (
            number("firerate", &mut errors),
            number("damage", &mut errors),
            number("ammoCapacity", &mut errors),
            number("reloadSpeed", &mut errors),
            number("range", &mut errors),
        )
    } else {
        (None, None, None, None, None)
    };

    let fire_mode = match attrs.map(|a| a.get("firemode").and_then(Value::as_str)) {
        Some(Some(raw)) => {
            let mode = fire_mode_from_name(raw);
            if mode.is_none() {
                errors.push(format!("attributes.firemode '{raw}' is not supported"));
            }
            mode
        }
        Some(None) => {
            errors.push("attributes.firemode must be string".to_string());
            None
        }
        None => None,
    };

    let whole = |field: &str, errors: &mut Vec<String>| -> Option<u32> {
        let value = attrs?.get(field)?;
        match value.as_f64() {
            Some(v) if v.fract() == 0.0 && v >= 1.0 && v <= f64::from(u32::MAX) => Some(v as u32),
            _ => {
                errors.push(format!("attributes.{field} must be a positive whole number"));
                None
            }
        }
    };

    if capacity.is_some_and(|c| c.fract() != 0.0 || c > f64::from(u32::MAX)) {
        errors.push("attributes.ammoCapacity must be a whole number".to_string());
    }
    let projectile_count = whole("count", &mut errors).unwrap_or(1);
    let burst_count = match fire_mode {
        Some(FireMode::Burst) => whole("burstCount", &mut errors).unwrap_or(DEFAULT_BURST_COUNT),
        _ => 0,
    };
    if let Some(c) = capacity {
        if burst_count > 0 && c < f64::from(burst_count) {
            errors.push(format!(
                "attributes.ammoCapacity {c} cannot cover a burst of {burst_count}"
            ));
        }
    }

    if !errors.is_empty() {
        return Err(CatalogError::Invalid {
            key: key.to_string(),
            errors,
        });
    }

    // All required fields are present past this point.
    let (
        Some(name),
        Some(class),
        Some(fire_interval_ms),
        Some(damage),
        Some(capacity),
        Some(reload_ms),
        Some(range_tiles),
        Some(fire_mode),
    ) = (
        name,
        class,
        fire_interval_ms,
        damage,
        capacity,
        reload_ms,
        range_tiles,
        fire_mode,
    )
    else {
        return Err(CatalogError::Invalid {
            key: key.to_string(),
            errors: vec!["incomplete template".to_string()],
        });
    };

    Ok(WeaponTemplate {
        key: key.to_string(),
        name: name.to_string(),
        class,
        damage,
        range: range_tiles * TILE_SIZE,
        fire_interval_ms,
        magazine_size: capacity as u32,
        reload_ms,
        spread_deg: optional("spread").unwrap_or(0.0),
        projectile_count,
        fire_mode,
        burst_count,
        burst_interval_ms: optional("burstInterval").unwrap_or(DEFAULT_BURST_INTERVAL_MS),
        color: doc
            .get("color")
            .and_then(Value::as_str)
            .unwrap_or("#ffff00")
            .to_string(),
    })
}
