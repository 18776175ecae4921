//! Guidance Catalog
//!
//! Static guidance text. Tier defaults are fixed configuration; feature
//! guidance is keyed by field and the side of the healthy range it fell on.

use super::types::Direction;
use crate::logic::risk::RiskTier;

// ============================================================================
// TIER DEFAULTS
// ============================================================================

static LOW_DEFAULTS: [&str; 5] = [
    "Keep up your current healthy lifestyle",
    "Reassess your stress level regularly",
    "Cultivate a positive mindset and emotional regulation",
    "Balance working time with rest",
    "Keep an eye on your physical and mental health indicators",
];

static MODERATE_DEFAULTS: [&str; 5] = [
    "Practise stress management techniques regularly",
    "Keep a healthy balance between work and personal life",
    "Build positive coping strategies",
    "Pay attention to physical warning signs and adjust early",
    "Strengthen social support and communication with family",
];

static HIGH_DEFAULTS: [&str; 5] = [
    "Seek professional psychological counselling",
    "Adjust your workload and working schedule",
    "Increase physical activity and look after your health",
    "Improve sleep quality and eating habits",
    "Consider discussing work pressure with your supervisor",
];

/// Default guidance for a tier (never empty)
pub fn tier_defaults(tier: RiskTier) -> &'static [&'static str] {
    match tier {
        RiskTier::Low => &LOW_DEFAULTS,
        RiskTier::Moderate => &MODERATE_DEFAULTS,
        RiskTier::High => &HIGH_DEFAULTS,
    }
}

// ============================================================================
// FEATURE GUIDANCE
// ============================================================================

/// Guidance for a factor outside its healthy range
pub fn feature_guidance(feature: &str, direction: Direction) -> Option<&'static str> {
    let text = match (feature, direction) {
        ("weekly_work_hours", Direction::Above) => {
            "Your weekly working hours are long; agree on a sustainable workload and protect your days off"
        }
        ("alcohol_units", Direction::Above) => {
            "Reduce alcohol intake; it disturbs sleep and adds to fatigue under stress"
        }
        ("moderate_exercise_hours", Direction::Below) => {
            "Add moderate exercise such as brisk walking or cycling, aiming for 2.5 hours a week"
        }
        ("vigorous_exercise_hours", Direction::Below) => {
            "Include some vigorous activity each week, such as running or team sports"
        }
        ("life_satisfaction", Direction::Below) => {
            "Low life satisfaction stands out; make time for relationships and activities you value, and consider talking to a counsellor"
        }
        ("fatigue_level", Direction::Above) => {
            "Persistent fatigue is a key warning sign; schedule recovery time and check in with a doctor if it continues"
        }
        ("sleep_disorder", Direction::Above) => {
            "Get your sleep problems assessed and keep a regular sleep schedule"
        }
        ("night_shift", Direction::Above) => {
            "Night shifts strain recovery; keep a fixed sleep window and ask about rotation limits"
        }
        ("shift_work", Direction::Above) => {
            "Rotating shifts disrupt your rhythm; plan rest around shift changes"
        }
        ("income_level", Direction::Below) => {
            "Financial pressure adds to strain; consider employee assistance or financial counselling services"
        }
        _ => return None,
    };
    Some(text)
}
