use serde::{Deserialize, Serialize};

/// A product as returned by the health API. Never mutated locally.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProductRecord {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub health_score: Option<String>, // "A".."E" when graded
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutrition_per_100g: NutritionFacts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additives: Vec<String>,
}

/// Nutrient amounts per 100 g. `null` and absent keys both read as `None`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct NutritionFacts {
    pub calories: Option<f64>, // kcal
    pub sugar: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub salt: Option<f64>,
    pub protein: Option<f64>,
    pub fiber: Option<f64>,
    pub fat: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let record: ProductRecord = serde_json::from_str(r#"{"name":"Oat Bar"}"#).unwrap();
        assert_eq!(record.name.as_deref(), Some("Oat Bar"));
        assert_eq!(record.nutrition_per_100g, NutritionFacts::default());
        assert!(record.additives.is_empty());
    }

    #[test]
    fn null_nutrients_and_additives_are_missing() {
        let record: ProductRecord = serde_json::from_str(
            r#"{"nutrition_per_100g":{"calories":120,"sugar":null},"additives":null}"#,
        )
        .unwrap();
        assert_eq!(record.nutrition_per_100g.calories, Some(120.0));
        assert_eq!(record.nutrition_per_100g.sugar, None);
        assert_eq!(record.nutrition_per_100g.fat, None);
        assert!(record.additives.is_empty());
    }

    #[test]
    fn null_nutrition_object_reads_as_all_missing() {
        let record: ProductRecord =
            serde_json::from_str(r#"{"nutrition_per_100g":null,"health_score":"B"}"#).unwrap();
        assert_eq!(record.nutrition_per_100g, NutritionFacts::default());
        assert_eq!(record.health_score.as_deref(), Some("B"));
    }
}
