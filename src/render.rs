use serde::Serialize;
use std::fmt;

use crate::product::{NutritionFacts, ProductRecord};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const DEFAULT_CATEGORY: &str = "General";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_TRAITS: &str = "No prominent positive or negative traits found.";
pub const NO_ADDITIVES: &str = "No significant additives found.";

/// Style tier of the score badge, green (A) through red (E).
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ScoreClass {
    A,
    B,
    C,
    D,
    E,
    #[serde(rename = "NA")]
    NotAvailable,
}

impl ScoreClass {
    pub fn for_grade(grade: &str) -> Self {
        match grade {
            "A" => ScoreClass::A,
            "B" => ScoreClass::B,
            "C" => ScoreClass::C,
            "D" => ScoreClass::D,
            "E" => ScoreClass::E,
            _ => ScoreClass::NotAvailable,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ScoreClass::A => "score-A",
            ScoreClass::B => "score-B",
            ScoreClass::C => "score-C",
            ScoreClass::D => "score-D",
            ScoreClass::E => "score-E",
            ScoreClass::NotAvailable => "score-NA",
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ScoreBadge {
    pub text: String,
    pub class: ScoreClass,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Positive,
    Negative,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct IndicatorBadge {
    pub text: &'static str,
    pub icon: &'static str,
    pub kind: IndicatorKind,
}

impl IndicatorBadge {
    const fn negative(icon: &'static str, text: &'static str) -> Self {
        Self { text, icon, kind: IndicatorKind::Negative }
    }

    const fn positive(icon: &'static str, text: &'static str) -> Self {
        Self { text, icon, kind: IndicatorKind::Positive }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NutritionRow {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// Everything the Result panel shows for one product.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultView {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub score: ScoreBadge,
    pub indicators: Vec<IndicatorBadge>,
    pub nutrition: Vec<NutritionRow>,
    pub additives: Vec<String>,
}

struct NutrientSlot {
    label: &'static str,
    unit: &'static str,
    read: fn(&NutritionFacts) -> Option<f64>,
}

const NUTRITION_ORDER: [NutrientSlot; 7] = [
    NutrientSlot { label: "Calories", unit: "kcal", read: |n| n.calories },
    NutrientSlot { label: "Sugar", unit: "g", read: |n| n.sugar },
    NutrientSlot { label: "Sat. Fat", unit: "g", read: |n| n.saturated_fat },
    NutrientSlot { label: "Salt", unit: "g", read: |n| n.salt },
    NutrientSlot { label: "Protein", unit: "g", read: |n| n.protein },
    NutrientSlot { label: "Fiber", unit: "g", read: |n| n.fiber },
    NutrientSlot { label: "Total Fat", unit: "g", read: |n| n.fat },
];

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn score_badge(health_score: Option<&str>) -> ScoreBadge {
    let text = non_empty_or(health_score, NOT_AVAILABLE);
    let class = ScoreClass::for_grade(&text);
    ScoreBadge { text, class }
}

/// Threshold rules over the nutrient amounts. Every rule runs; salt and sugar
/// pick at most one of high/low, checking high first.
pub fn indicator_badges(nutrition: &NutritionFacts) -> Vec<IndicatorBadge> {
    let mut indicators = Vec::new();

    if let Some(salt) = nutrition.salt {
        if salt > 1.2 {
            indicators.push(IndicatorBadge::negative("🚨", "High Salt"));
        } else if salt < 0.3 {
            indicators.push(IndicatorBadge::positive("✅", "Low Salt"));
        }
    }

    if let Some(sugar) = nutrition.sugar {
        if sugar > 20.0 {
            indicators.push(IndicatorBadge::negative("🛑", "High Sugar"));
        } else if sugar < 5.0 {
            indicators.push(IndicatorBadge::positive("✅", "Low Sugar"));
        }
    }

    if nutrition.saturated_fat.is_some_and(|v| v > 5.0) {
        indicators.push(IndicatorBadge::negative("⚠️", "High Sat. Fat"));
    }
    if nutrition.fiber.is_some_and(|v| v > 6.0) {
        indicators.push(IndicatorBadge::positive("⭐", "Good Source of Fiber"));
    }
    if nutrition.protein.is_some_and(|v| v > 10.0) {
        indicators.push(IndicatorBadge::positive("💪", "Good Protein Source"));
    }

    indicators
}

/// One decimal place, rounding on the exact stored value. Exact ties (x.25,
/// x.75) round away from zero rather than to even.
fn one_decimal(v: f64) -> String {
    let quarters = v * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}", (v * 10.0).round() / 10.0);
    }
    format!("{v:.1}")
}

pub fn nutrition_rows(nutrition: &NutritionFacts) -> Vec<NutritionRow> {
    NUTRITION_ORDER
        .iter()
        .map(|slot| NutritionRow {
            label: slot.label,
            value: match (slot.read)(nutrition) {
                Some(v) => one_decimal(v),
                None => NOT_AVAILABLE.to_string(),
            },
            unit: slot.unit,
        })
        .collect()
}

pub fn render_result(record: &ProductRecord) -> ResultView {
    ResultView {
        name: non_empty_or(record.name.as_deref(), UNKNOWN_PRODUCT),
        brand: non_empty_or(record.brand.as_deref(), UNKNOWN_BRAND),
        category: non_empty_or(record.category.as_deref(), DEFAULT_CATEGORY),
        score: score_badge(record.health_score.as_deref()),
        indicators: indicator_badges(&record.nutrition_per_100g),
        nutrition: nutrition_rows(&record.nutrition_per_100g),
        additives: record.additives.clone(),
    }
}

impl ResultView {
    /// Additive list items as displayed, with the placeholder for an empty list.
    pub fn additive_items(&self) -> Vec<&str> {
        if self.additives.is_empty() {
            vec![NO_ADDITIVES]
        } else {
            self.additives.iter().map(String::as_str).collect()
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{} · {}", self.brand, self.category)?;
        writeln!(f, "Health score: [{}] ({})", self.score.text, self.score.class.css_class())?;

        writeln!(f, "\nKey indicators")?;
        if self.indicators.is_empty() {
            writeln!(f, "  {NO_TRAITS}")?;
        }
        for badge in &self.indicators {
            let sign = match badge.kind {
                IndicatorKind::Positive => '+',
                IndicatorKind::Negative => '-',
            };
            writeln!(f, "  {sign} {} {}", badge.icon, badge.text)?;
        }

        writeln!(f, "\nNutrition per 100g")?;
        for row in &self.nutrition {
            writeln!(f, "  {:<10} {} {}", row.label, row.value, row.unit)?;
        }

        writeln!(f, "\nAdditives")?;
        for item in self.additive_items() {
            writeln!(f, "  • {item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(salt: Option<f64>, sugar: Option<f64>) -> NutritionFacts {
        NutritionFacts { salt, sugar, ..NutritionFacts::default() }
    }

    fn texts(badges: &[IndicatorBadge]) -> Vec<&'static str> {
        badges.iter().map(|b| b.text).collect()
    }

    #[test]
    fn grades_map_to_one_class_each() {
        for (grade, class) in [
            ("A", "score-A"),
            ("B", "score-B"),
            ("C", "score-C"),
            ("D", "score-D"),
            ("E", "score-E"),
            ("F", "score-NA"),
            ("a", "score-NA"),
        ] {
            assert_eq!(score_badge(Some(grade)).class.css_class(), class, "grade {grade}");
        }
    }

    #[test]
    fn missing_score_is_not_available() {
        for input in [None, Some("")] {
            let badge = score_badge(input);
            assert_eq!(badge.text, "N/A");
            assert_eq!(badge.class, ScoreClass::NotAvailable);
        }
    }

    #[test]
    fn unrecognized_grade_keeps_its_text() {
        let badge = score_badge(Some("Z"));
        assert_eq!(badge.text, "Z");
        assert_eq!(badge.class, ScoreClass::NotAvailable);
    }

    #[test]
    fn junk_food_raises_three_negative_badges() {
        let nutrition = NutritionFacts {
            calories: Some(250.0),
            sugar: Some(25.0),
            saturated_fat: Some(8.0),
            salt: Some(1.5),
            protein: Some(3.0),
            fiber: Some(1.0),
            fat: Some(10.0),
        };
        let badges = indicator_badges(&nutrition);
        assert_eq!(texts(&badges), ["High Salt", "High Sugar", "High Sat. Fat"]);
        assert!(badges.iter().all(|b| b.kind == IndicatorKind::Negative));
    }

    #[test]
    fn salt_and_sugar_never_both_high_and_low() {
        let samples = [0.0, 0.1, 0.29, 0.3, 1.0, 1.2, 1.21, 4.9, 5.0, 19.9, 20.0, 20.1, 80.0];
        for &salt in &samples {
            for &sugar in &samples {
                let badges = indicator_badges(&facts(Some(salt), Some(sugar)));
                let salt_count = badges.iter().filter(|b| b.text.ends_with("Salt")).count();
                let sugar_count = badges.iter().filter(|b| b.text.ends_with("Sugar")).count();
                assert!(salt_count <= 1, "salt {salt}");
                assert!(sugar_count <= 1, "sugar {sugar}");
            }
        }
    }

    #[test]
    fn thresholds_are_strict() {
        assert!(indicator_badges(&facts(Some(1.2), Some(20.0))).is_empty());
        assert_eq!(
            texts(&indicator_badges(&facts(Some(0.2), Some(4.0)))),
            ["Low Salt", "Low Sugar"]
        );
    }

    #[test]
    fn healthy_product_collects_positive_badges() {
        let nutrition = NutritionFacts {
            salt: Some(0.1),
            sugar: Some(2.0),
            saturated_fat: Some(1.0),
            fiber: Some(8.5),
            protein: Some(12.0),
            ..NutritionFacts::default()
        };
        let badges = indicator_badges(&nutrition);
        assert_eq!(
            texts(&badges),
            ["Low Salt", "Low Sugar", "Good Source of Fiber", "Good Protein Source"]
        );
        assert!(badges.iter().all(|b| b.kind == IndicatorKind::Positive));
    }

    #[test]
    fn missing_nutrients_raise_nothing() {
        assert!(indicator_badges(&NutritionFacts::default()).is_empty());
    }

    #[test]
    fn nutrition_rows_keep_display_order_and_format() {
        let nutrition = NutritionFacts {
            calories: Some(250.0),
            sugar: Some(12.34),
            salt: Some(0.5),
            fat: Some(3.0),
            ..NutritionFacts::default()
        };
        let rows = nutrition_rows(&nutrition);
        let labels: Vec<_> = rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            ["Calories", "Sugar", "Sat. Fat", "Salt", "Protein", "Fiber", "Total Fat"]
        );
        let values: Vec<_> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, ["250.0", "12.3", "N/A", "0.5", "N/A", "N/A", "3.0"]);
        assert_eq!(rows[0].unit, "kcal");
        assert!(rows[1..].iter().all(|r| r.unit == "g"));
    }

    #[test]
    fn quarter_values_round_half_up() {
        let nutrition = NutritionFacts {
            calories: Some(0.25),
            sugar: Some(1.25),
            saturated_fat: Some(0.75),
            salt: Some(0.05),
            protein: Some(2.25),
            fiber: Some(0.45),
            fat: Some(10.25),
        };
        let values: Vec<_> = nutrition_rows(&nutrition).into_iter().map(|r| r.value).collect();
        assert_eq!(values, ["0.3", "1.3", "0.8", "0.1", "2.3", "0.5", "10.3"]);
    }

    #[test]
    fn near_ties_round_on_stored_value() {
        // 0.15 and 0.35 are stored just below the tie.
        assert_eq!(one_decimal(0.15), "0.1");
        assert_eq!(one_decimal(0.35), "0.3");
        assert_eq!(one_decimal(-0.25), "-0.3");
        assert_eq!(one_decimal(3.0), "3.0");
    }

    #[test]
    fn header_falls_back_to_placeholders() {
        let record = ProductRecord { name: Some(String::new()), ..ProductRecord::default() };
        let view = render_result(&record);
        assert_eq!(view.name, "Unknown Product");
        assert_eq!(view.brand, "Unknown Brand");
        assert_eq!(view.category, "General");
        assert_eq!(view.score.text, "N/A");
        assert_eq!(view.score.class, ScoreClass::NotAvailable);
    }

    #[test]
    fn additives_render_in_order_or_placeholder() {
        let empty = render_result(&ProductRecord::default());
        assert_eq!(empty.additive_items(), [NO_ADDITIVES]);

        let record = ProductRecord {
            additives: vec!["E330".into(), "E102".into(), "E211".into()],
            ..ProductRecord::default()
        };
        assert_eq!(render_result(&record).additive_items(), ["E330", "E102", "E211"]);
    }

    #[test]
    fn text_output_shows_placeholder_when_no_traits() {
        let text = render_result(&ProductRecord::default()).to_string();
        assert!(text.contains(NO_TRAITS));
        assert!(text.contains("Health score: [N/A] (score-NA)"));
        assert!(text.contains(NO_ADDITIVES));
    }
}
