//! Item classification and material compatibility checks

use crate::material::{Category, MaterialDef};
use crate::MaterialKey;
use serde::{Deserialize, Serialize};

/// Map a host item type (and subtype) to an effect category
///
/// Shields may be stored as armor with a `shield` subtype.
pub fn classify(item_type: &str, subtype: Option<&str>) -> Option<Category> {
    match item_type {
        "weapon" => Some(Category::Weapon),
        "armor" if subtype == Some("shield") => Some(Category::Shield),
        "armor" => Some(Category::Armor),
        "shield" => Some(Category::Shield),
        _ => None,
    }
}

/// Shape information the host knows about an item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeHints<'a> {
    /// Base item slug, e.g. `greatclub`
    pub base_item: Option<&'a str>,
    /// Weapon or armor group, e.g. `chain`
    pub group: Option<&'a str>,
}

/// What an item of a category must look like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeRequirement {
    /// Base item slug contains one of the given fragments
    BaseItemContains(Vec<String>),
    /// Group is one of the given names
    GroupIn(Vec<String>),
}

impl ShapeRequirement {
    /// Check the requirement; unknown shapes always pass
    fn satisfied_by(&self, hints: &ShapeHints<'_>) -> bool {
        match self {
            ShapeRequirement::BaseItemContains(fragments) => match hints.base_item {
                Some(base) if !base.is_empty() => fragments.iter().any(|f| base.contains(f.as_str())),
                _ => true,
            },
            ShapeRequirement::GroupIn(groups) => match hints.group {
                Some(group) if !group.is_empty() => groups.iter().any(|g| g == group),
                _ => true,
            },
        }
    }
}

/// An advisory restriction of a material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub category: Category,
    pub requirement: ShapeRequirement,
    /// Localization key of the warning
    pub warning: String,
}

/// A soft incompatibility between a material and an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatWarning {
    pub material: MaterialKey,
    pub message: String,
}

/// Check an item's shape against a material's restrictions
pub fn check_compatibility(
    material: &MaterialDef,
    category: Category,
    hints: &ShapeHints<'_>,
) -> Vec<CompatWarning> {
    material
        .restrictions
        .iter()
        .filter(|r| r.category == category && !r.requirement.satisfied_by(hints))
        .map(|r| CompatWarning {
            material: material.key.clone(),
            message: r.warning.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duskwood() -> MaterialDef {
        let mut def = MaterialDef::new("duskwood", "Duskwood");
        def.restrictions.push(Restriction {
            category: Category::Weapon,
            requirement: ShapeRequirement::BaseItemContains(
                ["club", "staff", "bo-staff", "greatclub"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            warning: "PMR.Warnings.WyrootIncompatible".to_string(),
        });
        def
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("weapon", None), Some(Category::Weapon));
        assert_eq!(classify("armor", Some("medium")), Some(Category::Armor));
        assert_eq!(classify("armor", Some("shield")), Some(Category::Shield));
        assert_eq!(classify("shield", None), Some(Category::Shield));
        assert_eq!(classify("consumable", None), None);
    }

    #[test]
    fn test_wooden_weapon_passes() {
        let hints = ShapeHints {
            base_item: Some("greatclub"),
            group: Some("club"),
        };
        assert!(check_compatibility(&duskwood(), Category::Weapon, &hints).is_empty());
    }

    #[test]
    fn test_metal_weapon_warns() {
        let hints = ShapeHints {
            base_item: Some("longsword"),
            group: None,
        };
        let warnings = check_compatibility(&duskwood(), Category::Weapon, &hints);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "PMR.Warnings.WyrootIncompatible");
    }

    #[test]
    fn test_unknown_shape_and_other_category_never_warn() {
        let def = duskwood();
        assert!(check_compatibility(&def, Category::Weapon, &ShapeHints::default()).is_empty());
        let empty = ShapeHints {
            base_item: Some(""),
            group: None,
        };
        assert!(check_compatibility(&def, Category::Weapon, &empty).is_empty());

        let hints = ShapeHints {
            base_item: Some("breastplate"),
            group: None,
        };
        assert!(check_compatibility(&def, Category::Armor, &hints).is_empty());
    }

    #[test]
    fn test_group_requirement() {
        let mut def = MaterialDef::new("singing-steel", "Singing Steel");
        def.restrictions.push(Restriction {
            category: Category::Armor,
            requirement: ShapeRequirement::GroupIn(vec!["chain".to_string(), "composite".to_string()]),
            warning: "PMR.Warnings.SingingSteelArmorType".to_string(),
        });

        let plate = ShapeHints {
            base_item: None,
            group: Some("plate"),
        };
        let chain = ShapeHints {
            base_item: None,
            group: Some("chain"),
        };
        assert_eq!(check_compatibility(&def, Category::Armor, &plate).len(), 1);
        assert!(check_compatibility(&def, Category::Armor, &chain).is_empty());
    }
}
