use crate::models::{AirQualityIndex, AqiCategory, CategoryColor};

const fn rgba(red: u8, green: u8, blue: u8, opacity: f64) -> CategoryColor {
    CategoryColor {
        red,
        green,
        blue,
        opacity,
    }
}

/// Upper AQI bound (inclusive) for each category, lowest first.
/// Anything above the last bound is Hazardous.
const CATEGORY_BOUNDS: [(u32, AqiCategory); 5] = [
    (50, AqiCategory::Good),
    (100, AqiCategory::Moderate),
    (150, AqiCategory::UnhealthyForSensitiveGroups),
    (200, AqiCategory::Unhealthy),
    (300, AqiCategory::VeryUnhealthy),
];

pub fn category_for_aqi(index: AirQualityIndex) -> AqiCategory {
    CATEGORY_BOUNDS
        .iter()
        .find(|(upper, _)| index.value() <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(AqiCategory::Hazardous)
}

/// EPA display color for a category.
pub fn color_for_category(category: AqiCategory) -> CategoryColor {
    match category {
        AqiCategory::Good => rgba(0, 228, 0, 0.5),
        AqiCategory::Moderate => rgba(255, 255, 0, 0.5),
        AqiCategory::UnhealthyForSensitiveGroups => rgba(255, 126, 0, 0.6),
        AqiCategory::Unhealthy => rgba(255, 0, 0, 0.6),
        AqiCategory::VeryUnhealthy => rgba(143, 63, 151, 0.7),
        AqiCategory::Hazardous => rgba(126, 0, 35, 0.7),
    }
}

pub fn color_for_aqi(index: AirQualityIndex) -> CategoryColor {
    color_for_category(category_for_aqi(index))
}
