//! End-to-end BOM generation for an order configuration
//!
//! Each build contributes a list of top-level nodes; the lists are
//! concatenated in build order and consolidated once at the end.

use crate::core::bom::{consolidate, BomExpander, BomNode, BomReport};
use crate::core::catalog::CatalogStore;
use crate::core::rules::{self, category, SizeSelection};
use crate::entities::configuration::{BuildConfiguration, OrderConfiguration, PegboardSize};

/// Generate the consolidated BOM for a validated order configuration
pub fn generate_bom<C: CatalogStore + ?Sized>(catalog: &C, order: &OrderConfiguration) -> BomReport {
    let mut expander = BomExpander::new(catalog);
    let mut items: Vec<BomNode> = Vec::new();

    let manual = rules::manual_kit(order.customer.language);
    items.push(expander.expand(manual, 1, category::SYSTEM));

    for build in &order.build_numbers {
        let Some(config) = order.configurations.get(build) else {
            expander.warn(format!("Build {} has no configuration, skipped", build));
            continue;
        };
        let span = tracing::debug_span!("build", build = %build);
        let _guard = span.enter();
        items.extend(build_items(&mut expander, build, config));
    }

    for build in &order.build_numbers {
        let Some(selections) = order.accessories.get(build) else {
            continue;
        };
        for acc in selections {
            if acc.quantity == 0 {
                continue;
            }
            items.push(expander.expand(
                &acc.assembly_id,
                u64::from(acc.quantity),
                acc.category(),
            ));
        }
    }

    for build in order.accessories.keys() {
        if !order.build_numbers.contains(build) {
            expander.warn(format!(
                "Accessories listed for unknown build {}, skipped",
                build
            ));
        }
    }

    let hierarchical = consolidate(items);
    let report = BomReport::new(hierarchical, expander.into_warnings());
    tracing::debug!(
        top_level = report.top_level_items,
        total = report.total_items,
        warnings = report.warnings.len(),
        "BOM generated"
    );
    report
}

/// Top-level items for a single build, in generation order
fn build_items<C: CatalogStore + ?Sized>(
    expander: &mut BomExpander<'_, C>,
    build: &str,
    config: &BuildConfiguration,
) -> Vec<BomNode> {
    let mut items = Vec::new();

    match rules::sink_body(config.length) {
        Some(id) => items.push(expander.expand(id, 1, category::SINK_BODY)),
        None => expander.warn(format!(
            "Build {}: sink length {} is outside every sink body range",
            build, config.length
        )),
    }

    if let Some(code) = &config.legs_type {
        match rules::legs_kit(code) {
            Some(id) => items.push(expander.expand(id, 1, category::LEGS)),
            None => expander.warn(format!("Build {}: unknown legs type {}", build, code)),
        }
    }

    if let Some(code) = &config.feet_type {
        match rules::feet_kit(code) {
            Some(id) => items.push(expander.expand(id, 1, category::FEET)),
            None => expander.warn(format!("Build {}: unknown feet type {}", build, code)),
        }
    }

    if let Some(pegboard) = &config.pegboard {
        if let Some(code) = &pegboard.pegboard_type {
            match rules::pegboard_type_kit(code) {
                Some(id) => items.push(expander.expand(id, 1, category::PEGBOARD_TYPE)),
                None => expander.warn(format!("Build {}: unknown pegboard type {}", build, code)),
            }
        }

        match rules::pegboard_size(&pegboard.size, config.width, config.length) {
            Some(SizeSelection::Standard(id)) => {
                items.push(expander.expand(id, 1, category::PEGBOARD_SIZE))
            }
            Some(SizeSelection::Custom(id)) => {
                let (w, l) = match pegboard.size {
                    PegboardSize::Custom { width, length } => (Some(width), length),
                    PegboardSize::SameAsSink => (config.width, config.length),
                };
                let name = match w {
                    Some(w) => format!("Custom pegboard {}x{}", w, l),
                    None => "Custom pegboard".to_string(),
                };
                items.push(BomNode::custom(id, name, 1, category::PEGBOARD_SIZE));
            }
            None => expander.warn(format!(
                "Build {}: no pegboard size for length {} and no sink width to build a custom panel",
                build, config.length
            )),
        }

        items.push(expander.expand(rules::PEGBOARD_OHL_KIT, 1, category::PEGBOARD_OHL));
    }

    for basin in &config.basins {
        match rules::basin_type_kit(&basin.basin_type) {
            Some(id) => items.push(expander.expand(id, 1, category::BASIN_TYPE)),
            None => expander.warn(format!(
                "Build {}: unknown basin type {}",
                build, basin.basin_type
            )),
        }

        match rules::basin_size(basin) {
            Some(SizeSelection::Standard(id)) => {
                items.push(expander.expand(id, 1, category::BASIN_SIZE))
            }
            Some(SizeSelection::Custom(id)) => {
                let name = format!("Custom basin {}", basin.basin_size.to_lowercase());
                items.push(BomNode::custom(id, name, 1, category::BASIN_SIZE));
            }
            None => expander.warn(format!(
                "Build {}: basin size {} is not WxLxD",
                build, basin.basin_size
            )),
        }

        for addon in &basin.addons {
            match rules::basin_addon(addon, &basin.basin_type) {
                Some((id, cat)) => items.push(expander.expand(id, 1, cat)),
                None => expander.warn(format!("Build {}: unknown basin add-on {}", build, addon)),
            }
        }
    }

    let control_box = match &config.control_box_id {
        Some(id) => Some(id.clone()),
        None if config.basins.is_empty() => None,
        None => {
            let (e_sink, e_drain) = rules::basin_counts(&config.basins);
            let id = rules::control_box(e_sink, e_drain);
            if id.is_none() {
                expander.warn(format!(
                    "Build {}: no control box for {} E-Sink and {} E-Drain basins",
                    build, e_sink, e_drain
                ));
            }
            id.map(str::to_string)
        }
    };
    if let Some(id) = control_box {
        items.push(expander.expand(&id, 1, category::CONTROL_BOX));
    }

    if config.faucets.is_empty() {
        if let Some(code) = rules::auto_faucet(&config.basins) {
            tracing::debug!(build, faucet = code, "faucet auto-selected from basin type");
            if let Some(id) = rules::faucet_kit(code) {
                items.push(expander.expand(id, 1, category::FAUCET));
            }
        }
    }

    let placements = rules::faucet_placements(config.basins.len());
    for faucet in &config.faucets {
        if let Some(placement) = &faucet.placement {
            if !placements.contains(&placement.as_str()) {
                expander.warn(format!(
                    "Build {}: faucet placement {} is not available with {} basin(s)",
                    build,
                    placement,
                    config.basins.len()
                ));
            }
        }
        let quantity = faucet.effective_quantity();
        if quantity == 0 {
            continue;
        }
        match rules::faucet_kit(&faucet.faucet_type) {
            Some(id) => items.push(expander.expand(id, u64::from(quantity), category::FAUCET)),
            None => expander.warn(format!(
                "Build {}: unknown faucet type {}",
                build, faucet.faucet_type
            )),
        }
    }

    for sprayer in &config.sprayers {
        let quantity = sprayer.effective_quantity();
        if quantity == 0 {
            continue;
        }
        for code in sprayer.sprayer_type.codes() {
            match rules::sprayer_kit(code) {
                Some(id) => items.push(expander.expand(id, u64::from(quantity), category::SPRAYER)),
                None => expander.warn(format!("Build {}: unknown sprayer type {}", build, code)),
            }
        }
    }

    items
}
