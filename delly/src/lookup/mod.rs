//! Single service tag lookup for the `info` command.

use chrono::NaiveDate;
use serde_json::Value;

use crate::client::WarrantyClient;
use crate::enrich::{model_name, warranty_start};
use crate::error::ClientResult;
use crate::logs::Logger;
use crate::models::{AssetHeader, AssetWarranty, Entitlement, ServiceTag, WarrantyInfo, UNKNOWN};

pub const TABLE_TITLE: &str = "Warranty Information";

/// Look up one service tag.
///
/// The tag is upper-cased first. Returns `Ok(None)` (and logs a warning)
/// when the API has no record for it. With `extended`, entitlement lines
/// and additional product fields are appended.
pub async fn get_warranty_info(
    client: &WarrantyClient,
    service_tag: &str,
    extended: bool,
    log: &Logger,
) -> ClientResult<Option<WarrantyInfo>> {
    let tag = ServiceTag::new(service_tag.trim().to_uppercase());
    log.info(format!("Fetching information for Service Tag: {}", tag));

    let headers = client.get_asset_headers(std::slice::from_ref(&tag)).await?;
    let summary = client.get_asset_summary(&tag).await?;

    let Some(header) = find_by_tag(headers, &tag, |h| &h.service_tag) else {
        log.warning(format!("No information found for Service Tag: {}", tag));
        return Ok(None);
    };

    let mut info = WarrantyInfo::new(TABLE_TITLE);
    info.add_row("Service Tag", tag.as_str());
    info.add_row("Model", model_name(Some(&header)));
    info.add_row("Warranty Start", warranty_start(header.ship_date.as_deref()));

    if extended {
        let warranties = client.get_asset_warranty(std::slice::from_ref(&tag)).await?;
        let entitlements = find_by_tag(warranties, &tag, |w| &w.header.service_tag)
            .map(|w: AssetWarranty| w.entitlements)
            .unwrap_or_default();
        add_extended_rows(&mut info, &header, &entitlements, &summary);
    }

    Ok(Some(info))
}

fn find_by_tag<T>(records: Vec<T>, tag: &ServiceTag, key: impl Fn(&T) -> &String) -> Option<T> {
    let wanted = tag.normalized();
    records
        .into_iter()
        .find(|r| key(r).trim().eq_ignore_ascii_case(&wanted))
}

fn or_unknown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Leading `YYYY-MM-DD` of an API timestamp.
///
/// Entitlement dates carry fractional seconds, so this is looser than
/// [`warranty_start`].
pub fn api_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn add_extended_rows(
    info: &mut WarrantyInfo,
    header: &AssetHeader,
    entitlements: &[Entitlement],
    summary: &Value,
) {
    info.add_row("Product Family", or_unknown(header.product_family.as_deref()));
    info.add_row("System Description", or_unknown(header.system_description.as_deref()));
    info.add_row("Product Line", or_unknown(header.product_lob_description.as_deref()));
    info.add_row("Country", or_unknown(header.country_code.as_deref()));
    info.add_row("Ship Date", or_unknown(header.ship_date.as_deref()));

    let mut sorted: Vec<&Entitlement> = entitlements.iter().collect();
    sorted.sort_by_key(|e| api_date(e.start_date.as_deref()));

    for entitlement in &sorted {
        let name = entitlement
            .service_level_description
            .as_deref()
            .or(entitlement.service_level_code.as_deref())
            .unwrap_or("Entitlement");
        let kind = entitlement
            .entitlement_type
            .as_deref()
            .map(|t| format!(" ({})", t))
            .unwrap_or_default();
        info.add_row(
            format!("{}{}", name, kind),
            format!(
                "{} → {}",
                format_date(api_date(entitlement.start_date.as_deref())),
                format_date(api_date(entitlement.end_date.as_deref()))
            ),
        );
    }

    let warranty_end = sorted
        .iter()
        .filter_map(|e| api_date(e.end_date.as_deref()))
        .max();
    info.add_row("Warranty End", format_date(warranty_end));

    if let Some(components) = summary.get("components").and_then(Value::as_array) {
        info.add_row("Components", components.len().to_string());
    }
}
