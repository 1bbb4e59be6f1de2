use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Closed set of catalog tags the planner understands.
///
/// Role tags place a food into a meal group; safety tags mark dietary
/// suitability; `Contains*` tags mark restriction triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ProteinBreakfast,
    CarbsBreakfast,
    Eggs,
    ProteinLunch,
    CarbsLunch,
    LegumesLunch,
    /// Property tag: the food is a legume regardless of which group it sits in.
    Legume,
    ProteinSnack,
    SweetsSnack,
    FruitSnack,
    FatSnack,
    ProteinDinner,
    VeggieProteinDinner,
    CarbsDinner,
    DairyDinner,
    BreadDinner,
    SafeVegan,
    SafeVegetarian,
    SafeGlutenFree,
    SafeLactoseFree,
    ContainsGluten,
    ContainsLactose,
}

/// Raw tag string -> category. Aliases seen in stored catalogs map onto the
/// same variant.
static TAG_TABLE: LazyLock<HashMap<&'static str, Category>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("protein_breakfast", Category::ProteinBreakfast);
    m.insert("carbs_breakfast", Category::CarbsBreakfast);
    m.insert("bread_breakfast", Category::CarbsBreakfast);
    m.insert("eggs", Category::Eggs);
    m.insert("eggs_breakfast", Category::Eggs);
    m.insert("protein_lunch", Category::ProteinLunch);
    m.insert("carbs_lunch", Category::CarbsLunch);
    m.insert("legumes_lunch", Category::LegumesLunch);
    m.insert("legume", Category::Legume);
    m.insert("legumes", Category::Legume);
    m.insert("protein_snack", Category::ProteinSnack);
    m.insert("sweets_snack", Category::SweetsSnack);
    m.insert("fruit_snack", Category::FruitSnack);
    m.insert("fat_snack", Category::FatSnack);
    m.insert("protein_dinner", Category::ProteinDinner);
    m.insert("meat_dinner", Category::ProteinDinner);
    m.insert("veggie_protein_dinner", Category::VeggieProteinDinner);
    m.insert("carbs_dinner", Category::CarbsDinner);
    m.insert("dairy_dinner", Category::DairyDinner);
    m.insert("bread_dinner", Category::BreadDinner);
    m.insert("safe_vegan", Category::SafeVegan);
    m.insert("safe_vegetarian", Category::SafeVegetarian);
    m.insert("safe_gluten_free", Category::SafeGlutenFree);
    m.insert("safe_lactose_free", Category::SafeLactoseFree);
    m.insert("gluten", Category::ContainsGluten);
    m.insert("contains_gluten", Category::ContainsGluten);
    m.insert("lactose", Category::ContainsLactose);
    m.insert("contains_lactose", Category::ContainsLactose);
    m.insert("dairy", Category::ContainsLactose);
    m
});

impl Category {
    /// Map a raw catalog tag (case-insensitive, surrounding whitespace ignored).
    pub fn from_tag(tag: &str) -> Option<Category> {
        TAG_TABLE
            .get(tag.trim().to_lowercase().as_str())
            .copied()
    }

    /// Canonical tag string.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Category::ProteinBreakfast => "protein_breakfast",
            Category::CarbsBreakfast => "carbs_breakfast",
            Category::Eggs => "eggs",
            Category::ProteinLunch => "protein_lunch",
            Category::CarbsLunch => "carbs_lunch",
            Category::LegumesLunch => "legumes_lunch",
            Category::Legume => "legume",
            Category::ProteinSnack => "protein_snack",
            Category::SweetsSnack => "sweets_snack",
            Category::FruitSnack => "fruit_snack",
            Category::FatSnack => "fat_snack",
            Category::ProteinDinner => "protein_dinner",
            Category::VeggieProteinDinner => "veggie_protein_dinner",
            Category::CarbsDinner => "carbs_dinner",
            Category::DairyDinner => "dairy_dinner",
            Category::BreadDinner => "bread_dinner",
            Category::SafeVegan => "safe_vegan",
            Category::SafeVegetarian => "safe_vegetarian",
            Category::SafeGlutenFree => "safe_gluten_free",
            Category::SafeLactoseFree => "safe_lactose_free",
            Category::ContainsGluten => "contains_gluten",
            Category::ContainsLactose => "contains_lactose",
        }
    }

    /// True for tags that assign a food to a meal group.
    pub fn is_role(&self) -> bool {
        !matches!(
            self,
            Category::Legume
                | Category::SafeVegan
                | Category::SafeVegetarian
                | Category::SafeGlutenFree
                | Category::SafeLactoseFree
                | Category::ContainsGluten
                | Category::ContainsLactose
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}
