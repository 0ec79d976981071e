//! Selection rules - configuration value to catalog id
//!
//! Every rule is a fixed table or a numeric range test. An unmapped input
//! yields `None`; the generator turns that into a warning rather than an
//! error.

use crate::entities::configuration::{BasinConfiguration, Language, PegboardSize};

/// Category tags attached to top-level BOM lines
pub mod category {
    pub const SYSTEM: &str = "SYSTEM";
    pub const SINK_BODY: &str = "SINK_BODY";
    pub const LEGS: &str = "LEGS";
    pub const FEET: &str = "FEET";
    pub const PEGBOARD_TYPE: &str = "PEGBOARD_TYPE";
    pub const PEGBOARD_SIZE: &str = "PEGBOARD_SIZE";
    pub const PEGBOARD_OHL: &str = "PEGBOARD_OHL";
    pub const BASIN_TYPE: &str = "BASIN_TYPE";
    pub const BASIN_SIZE: &str = "BASIN_SIZE";
    pub const BASIN_ADDON_PTRAP: &str = "BASIN_ADDON_PTRAP";
    pub const BASIN_ADDON_LIGHT: &str = "BASIN_ADDON_LIGHT";
    pub const CONTROL_BOX: &str = "CONTROL_BOX";
    pub const FAUCET: &str = "FAUCET";
    pub const SPRAYER: &str = "SPRAYER";
}

/// Overhead light kit that accompanies every pegboard
pub const PEGBOARD_OHL_KIT: &str = "T2-OHL-MDRD-KIT";

pub const BASIN_E_SINK: &str = "E_SINK";
pub const BASIN_E_SINK_DI: &str = "E_SINK_DI";
pub const BASIN_E_DRAIN: &str = "E_DRAIN";

const LEGS_KITS: &[(&str, &str)] = &[
    ("DL27", "T2-DL27-KIT"),
    ("DL14", "T2-DL14-KIT"),
    ("LC1", "T2-LC1-KIT"),
    ("DL27-FH", "T2-DL27-FH-KIT"),
    ("DL14-FH", "T2-DL14-FH-KIT"),
];

const FEET_KITS: &[(&str, &str)] = &[
    ("CASTERS", "T2-LEVELING-CASTOR-475"),
    ("SEISMIC", "T2-SEISMIC-FEET"),
];

const PEGBOARD_TYPE_KITS: &[(&str, &str)] = &[
    ("PERFORATED", "T2-ADW-PB-PERF-KIT"),
    ("SOLID", "T2-ADW-PB-SOLID-KIT"),
];

/// (min length, max length, panel id), inclusive ranges
const PEGBOARD_SIZES: &[(u32, u32, &str)] = &[
    (34, 47, "T2-ADW-PB-3436"),
    (48, 59, "T2-ADW-PB-4836"),
    (60, 71, "T2-ADW-PB-6036"),
    (72, 83, "T2-ADW-PB-7236"),
    (84, 95, "T2-ADW-PB-8436"),
    (96, 107, "T2-ADW-PB-9636"),
    (108, 120, "T2-ADW-PB-10836"),
];

const SINK_BODIES: &[(u32, u32, &str)] = &[
    (34, 60, "T2-BODY-48-60-HA"),
    (61, 72, "T2-BODY-61-72-HA"),
    (73, 120, "T2-BODY-73-120-HA"),
];

const BASIN_TYPE_KITS: &[(&str, &str)] = &[
    (BASIN_E_SINK, "T2-BSN-ESK-KIT"),
    (BASIN_E_SINK_DI, "T2-BSN-ESK-DI-KIT"),
    (BASIN_E_DRAIN, "T2-BSN-EDR-KIT"),
];

const BASIN_SIZES: &[(&str, &str)] = &[
    ("20X20X8", "T2-ADW-BASIN20X20X8"),
    ("24X20X8", "T2-ADW-BASIN24X20X8"),
    ("24X20X10", "T2-ADW-BASIN24X20X10"),
    ("30X20X8", "T2-ADW-BASIN30X20X8"),
    ("30X20X10", "T2-ADW-BASIN30X20X10"),
];

/// (eSink count, eDrain count, control box id)
const CONTROL_BOXES: &[(usize, usize, &str)] = &[
    (1, 0, "T2-CTRL-ESK1"),
    (0, 1, "T2-CTRL-EDR1"),
    (1, 1, "T2-CTRL-EDR1-ESK1"),
    (2, 0, "T2-CTRL-ESK2"),
    (0, 2, "T2-CTRL-EDR2"),
    (2, 1, "T2-CTRL-EDR1-ESK2"),
    (1, 2, "T2-CTRL-EDR2-ESK1"),
    (3, 0, "T2-CTRL-ESK3"),
    (0, 3, "T2-CTRL-EDR3"),
];

const FAUCET_KITS: &[(&str, &str)] = &[
    ("STD_WRIST_BLADE", "T2-OA-STD-FAUCET-WB-KIT"),
    ("PRE_RINSE", "T2-OA-PRE-RINSE-FAUCET-KIT"),
    ("GOOSENECK_DI", "T2-OA-DI-GOOSENECK-FAUCET-KIT"),
];

const SPRAYER_KITS: &[(&str, &str)] = &[
    ("DI_WATER_TURRET", "T2-OA-WATERGUN-TURRET-KIT"),
    ("DI_WATER_ROSETTE", "T2-OA-WATERGUN-ROSETTE-KIT"),
    ("AIR_GUN_TURRET", "T2-OA-AIRGUN-TURRET-KIT"),
    ("AIR_GUN_ROSETTE", "T2-OA-AIRGUN-ROSETTE-KIT"),
];

/// Basin count each sink model is built for
const SINK_MODELS: &[(&str, usize)] = &[("T2-B1", 1), ("T2-B2", 2), ("T2-B3", 3)];

pub const FAUCET_GOOSENECK_DI: &str = "GOOSENECK_DI";
pub const PLACEMENT_CENTER: &str = "CENTER";
pub const PLACEMENT_BETWEEN_BASINS: &str = "BETWEEN_BASINS";

const P_TRAP_KIT: &str = "T2-OA-MS-1026";
const BASIN_LIGHT_EDR_KIT: &str = "T2-OA-BASIN-LIGHT-EDR-KIT";
const BASIN_LIGHT_ESK_KIT: &str = "T2-OA-BASIN-LIGHT-ESK-KIT";

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(code, _)| *code == key)
        .map(|(_, id)| *id)
}

fn lookup_range(table: &[(u32, u32, &'static str)], value: u32) -> Option<&'static str> {
    table
        .iter()
        .find(|(min, max, _)| (*min..=*max).contains(&value))
        .map(|(_, _, id)| *id)
}

/// Either a catalog id or a synthesized custom part number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSelection {
    Standard(&'static str),
    Custom(String),
}

impl SizeSelection {
    pub fn id(&self) -> &str {
        match self {
            SizeSelection::Standard(id) => id,
            SizeSelection::Custom(id) => id,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, SizeSelection::Custom(_))
    }
}

/// Manual kit, one per order
pub fn manual_kit(language: Language) -> &'static str {
    match language {
        Language::French => "T2-STD-MANUAL-FR-KIT",
        _ => "T2-STD-MANUAL-EN-KIT",
    }
}

/// Sink body by length in inches; `None` outside 34..=120
pub fn sink_body(length: u32) -> Option<&'static str> {
    lookup_range(SINK_BODIES, length)
}

pub fn legs_kit(code: &str) -> Option<&'static str> {
    lookup(LEGS_KITS, code)
}

pub fn feet_kit(code: &str) -> Option<&'static str> {
    lookup(FEET_KITS, code)
}

pub fn pegboard_type_kit(code: &str) -> Option<&'static str> {
    lookup(PEGBOARD_TYPE_KITS, code)
}

/// Standard pegboard panel covering `length`
pub fn standard_pegboard(length: u32) -> Option<&'static str> {
    lookup_range(PEGBOARD_SIZES, length)
}

pub fn custom_pegboard_number(width: u32, length: u32) -> String {
    format!("720.215.002 T2-ADW-PB-{}x{}", width, length)
}

/// Pegboard size item
///
/// `SAME_AS_SINK` picks the standard panel for the sink length and falls back
/// to a custom panel of sink width x length. Without a sink width there is
/// nothing to synthesize from, so the result is `None`.
pub fn pegboard_size(
    size: &PegboardSize,
    sink_width: Option<u32>,
    sink_length: u32,
) -> Option<SizeSelection> {
    match size {
        PegboardSize::SameAsSink => standard_pegboard(sink_length)
            .map(SizeSelection::Standard)
            .or_else(|| {
                sink_width.map(|w| SizeSelection::Custom(custom_pegboard_number(w, sink_length)))
            }),
        PegboardSize::Custom { width, length } => {
            Some(SizeSelection::Custom(custom_pegboard_number(*width, *length)))
        }
    }
}

pub fn basin_type_kit(code: &str) -> Option<&'static str> {
    lookup(BASIN_TYPE_KITS, code)
}

pub fn custom_basin_number(width: u32, length: u32, depth: u32) -> String {
    format!("720.215.001 T2-ADW-BASIN-{}x{}x{}", width, length, depth)
}

/// Basin size item: standard table match (case-insensitive) or custom number
pub fn basin_size(basin: &BasinConfiguration) -> Option<SizeSelection> {
    let key = basin.basin_size.trim().to_uppercase();
    if let Some(id) = lookup(BASIN_SIZES, &key) {
        return Some(SizeSelection::Standard(id));
    }
    basin
        .dimensions()
        .map(|(w, l, d)| SizeSelection::Custom(custom_basin_number(w, l, d)))
}

/// Basin add-on kit plus the category it is filed under
///
/// The light kit depends on the owning basin's type.
pub fn basin_addon(addon: &str, basin_type: &str) -> Option<(&'static str, &'static str)> {
    match addon {
        "P_TRAP" | "PTRAP_DRAIN" => Some((P_TRAP_KIT, category::BASIN_ADDON_PTRAP)),
        "BASIN_LIGHT" if basin_type == BASIN_E_DRAIN => {
            Some((BASIN_LIGHT_EDR_KIT, category::BASIN_ADDON_LIGHT))
        }
        "BASIN_LIGHT" => Some((BASIN_LIGHT_ESK_KIT, category::BASIN_ADDON_LIGHT)),
        _ => None,
    }
}

/// `(eSink family count, eDrain count)` across a build's basins
pub fn basin_counts(basins: &[BasinConfiguration]) -> (usize, usize) {
    let e_sink = basins
        .iter()
        .filter(|b| b.basin_type == BASIN_E_SINK || b.basin_type == BASIN_E_SINK_DI)
        .count();
    let e_drain = basins
        .iter()
        .filter(|b| b.basin_type == BASIN_E_DRAIN)
        .count();
    (e_sink, e_drain)
}

/// Control box for a count pair; `None` for unmapped pairs including (0, 0)
pub fn control_box(e_sink: usize, e_drain: usize) -> Option<&'static str> {
    CONTROL_BOXES
        .iter()
        .find(|(s, d, _)| *s == e_sink && *d == e_drain)
        .map(|(_, _, id)| *id)
}

pub fn faucet_kit(code: &str) -> Option<&'static str> {
    lookup(FAUCET_KITS, code)
}

pub fn sprayer_kit(code: &str) -> Option<&'static str> {
    lookup(SPRAYER_KITS, code)
}

/// Basins a sink model requires; `None` for models outside the T2-B range
pub fn model_basin_count(sink_model_id: &str) -> Option<usize> {
    SINK_MODELS
        .iter()
        .find(|(model, _)| *model == sink_model_id)
        .map(|(_, count)| *count)
}

/// Faucet type implied by the basins when the order names none
///
/// Any E-Sink DI basin needs treated water, so it gets the gooseneck.
pub fn auto_faucet(basins: &[BasinConfiguration]) -> Option<&'static str> {
    basins
        .iter()
        .any(|b| b.basin_type == BASIN_E_SINK_DI)
        .then_some(FAUCET_GOOSENECK_DI)
}

/// Faucet placements offered for a sink with `basin_count` basins
pub fn faucet_placements(basin_count: usize) -> Vec<&'static str> {
    let mut placements = vec![PLACEMENT_CENTER];
    if basin_count > 1 {
        placements.push(PLACEMENT_BETWEEN_BASINS);
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basin(basin_type: &str, size: &str) -> BasinConfiguration {
        BasinConfiguration {
            basin_type: basin_type.to_string(),
            basin_size: size.to_string(),
            addons: vec![],
        }
    }

    #[test]
    fn test_sink_body_ranges() {
        assert_eq!(sink_body(33), None);
        assert_eq!(sink_body(34), Some("T2-BODY-48-60-HA"));
        assert_eq!(sink_body(60), Some("T2-BODY-48-60-HA"));
        assert_eq!(sink_body(61), Some("T2-BODY-61-72-HA"));
        assert_eq!(sink_body(72), Some("T2-BODY-61-72-HA"));
        assert_eq!(sink_body(73), Some("T2-BODY-73-120-HA"));
        assert_eq!(sink_body(120), Some("T2-BODY-73-120-HA"));
        assert_eq!(sink_body(121), None);
    }

    #[test]
    fn test_exact_match_tables() {
        assert_eq!(legs_kit("DL14-FH"), Some("T2-DL14-FH-KIT"));
        assert_eq!(legs_kit("dl27"), None);
        assert_eq!(feet_kit("SEISMIC"), Some("T2-SEISMIC-FEET"));
        assert_eq!(pegboard_type_kit("SOLID"), Some("T2-ADW-PB-SOLID-KIT"));
        assert_eq!(basin_type_kit("E_SINK_DI"), Some("T2-BSN-ESK-DI-KIT"));
        assert_eq!(faucet_kit("PRE_RINSE"), Some("T2-OA-PRE-RINSE-FAUCET-KIT"));
        assert_eq!(sprayer_kit("AIR_GUN_ROSETTE"), Some("T2-OA-AIRGUN-ROSETTE-KIT"));
        assert_eq!(sprayer_kit("GARDEN_HOSE"), None);
    }

    #[test]
    fn test_manual_kit_by_language() {
        assert_eq!(manual_kit(Language::French), "T2-STD-MANUAL-FR-KIT");
        assert_eq!(manual_kit(Language::English), "T2-STD-MANUAL-EN-KIT");
        assert_eq!(manual_kit(Language::Spanish), "T2-STD-MANUAL-EN-KIT");
    }

    #[test]
    fn test_pegboard_size_same_as_sink() {
        let same = PegboardSize::SameAsSink;
        assert_eq!(
            pegboard_size(&same, Some(30), 48),
            Some(SizeSelection::Standard("T2-ADW-PB-4836"))
        );
        assert_eq!(
            pegboard_size(&same, Some(30), 120),
            Some(SizeSelection::Standard("T2-ADW-PB-10836"))
        );
        assert_eq!(
            pegboard_size(&same, Some(30), 130),
            Some(SizeSelection::Custom("720.215.002 T2-ADW-PB-30x130".to_string()))
        );
        assert_eq!(pegboard_size(&same, None, 130), None);
    }

    #[test]
    fn test_pegboard_size_custom_always_custom() {
        let custom = PegboardSize::Custom {
            width: 36,
            length: 48,
        };
        let selection = pegboard_size(&custom, Some(30), 48).unwrap();
        assert!(selection.is_custom());
        assert_eq!(selection.id(), "720.215.002 T2-ADW-PB-36x48");
    }

    #[test]
    fn test_basin_size_standard_and_custom() {
        assert_eq!(
            basin_size(&basin(BASIN_E_SINK, "24X20X8")),
            Some(SizeSelection::Standard("T2-ADW-BASIN24X20X8"))
        );
        assert_eq!(
            basin_size(&basin(BASIN_E_SINK, "24x20x10")),
            Some(SizeSelection::Standard("T2-ADW-BASIN24X20X10"))
        );
        assert_eq!(
            basin_size(&basin(BASIN_E_SINK, "26x22x9")),
            Some(SizeSelection::Custom(
                "720.215.001 T2-ADW-BASIN-26x22x9".to_string()
            ))
        );
        assert_eq!(basin_size(&basin(BASIN_E_SINK, "big")), None);
    }

    #[test]
    fn test_basin_light_depends_on_basin_type() {
        assert_eq!(
            basin_addon("BASIN_LIGHT", BASIN_E_DRAIN),
            Some((BASIN_LIGHT_EDR_KIT, category::BASIN_ADDON_LIGHT))
        );
        assert_eq!(
            basin_addon("BASIN_LIGHT", BASIN_E_SINK_DI),
            Some((BASIN_LIGHT_ESK_KIT, category::BASIN_ADDON_LIGHT))
        );
        assert_eq!(
            basin_addon("P_TRAP", BASIN_E_SINK),
            Some((P_TRAP_KIT, category::BASIN_ADDON_PTRAP))
        );
        assert_eq!(basin_addon("FOOT_PEDAL", BASIN_E_SINK), None);
    }

    #[test]
    fn test_control_box_count_pairs() {
        let basins = vec![
            basin(BASIN_E_DRAIN, "24X20X8"),
            basin(BASIN_E_SINK, "24X20X8"),
            basin(BASIN_E_SINK_DI, "24X20X8"),
        ];
        let (s, d) = basin_counts(&basins);
        assert_eq!((s, d), (2, 1));
        assert_eq!(control_box(s, d), Some("T2-CTRL-EDR1-ESK2"));
        assert_eq!(control_box(1, 2), Some("T2-CTRL-EDR2-ESK1"));
        assert_eq!(control_box(0, 0), None);
        assert_eq!(control_box(2, 2), None);
    }

    #[test]
    fn test_model_basin_count() {
        assert_eq!(model_basin_count("T2-B1"), Some(1));
        assert_eq!(model_basin_count("T2-B3"), Some(3));
        assert_eq!(model_basin_count("T2-CUSTOM"), None);
    }

    #[test]
    fn test_e_sink_di_selects_gooseneck() {
        assert_eq!(auto_faucet(&[basin(BASIN_E_SINK, "24X20X8")]), None);
        assert_eq!(
            auto_faucet(&[
                basin(BASIN_E_DRAIN, "24X20X8"),
                basin(BASIN_E_SINK_DI, "24X20X8")
            ]),
            Some(FAUCET_GOOSENECK_DI)
        );
        assert_eq!(
            faucet_kit(FAUCET_GOOSENECK_DI),
            Some("T2-OA-DI-GOOSENECK-FAUCET-KIT")
        );
    }

    #[test]
    fn test_between_basins_needs_two_basins() {
        assert_eq!(faucet_placements(1), vec![PLACEMENT_CENTER]);
        assert_eq!(
            faucet_placements(2),
            vec![PLACEMENT_CENTER, PLACEMENT_BETWEEN_BASINS]
        );
    }
}
