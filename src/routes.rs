use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use enel_invoice_ocr::{
    ExtractOptions, Invoice, LayoutId, LayoutMode, LayoutRules, RecordedOcr, extract_invoice,
    regions, rules_from_parts, write_csv_to_string,
};
use serde::Serialize;
use worker::{Context, Env, Request, Response, Result, RouteContext, Router};

use crate::error::ApiError;
use crate::models::{
    InvoiceRequest, InvoiceResponse, LAYOUT_ANCHOR_REGION_VAR, LAYOUT_ANCHORS_VAR, RegionsResponse,
    ResponseFormat,
};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub rules: Option<LayoutRules>,
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let state = AppState {
        rules: layout_rules_from_env(&env),
    };

    Router::with_data(state)
        .post_async("/api/v1/invoice", invoice_route)
        .get_async("/api/v1/regions", regions_route)
        .run(req, env)
        .await
}

fn layout_rules_from_env(env: &Env) -> Option<LayoutRules> {
    let anchors = env.var(LAYOUT_ANCHORS_VAR).ok()?.to_string();
    let region = env.var(LAYOUT_ANCHOR_REGION_VAR).ok()?.to_string();
    match rules_from_parts(&anchors, &region) {
        Ok(rules) => Some(rules),
        Err(error) => {
            worker::console_error!("ignoring layout rules from environment: {error}");
            None
        }
    }
}

async fn invoice_route(mut req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match invoice_response(&mut req, &ctx.data).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn regions_route(req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    let response = parse_query(&req)
        .and_then(|query| parse_layout_query(&query))
        .map(regions_response);
    match response {
        Ok(response) => json_response(&response),
        Err(error) => error.into_response(),
    }
}

async fn invoice_response(req: &mut Request, state: &AppState) -> Result<Response, ApiError> {
    let content_type = req.headers().get("Content-Type")?;
    ensure_json_content_type(content_type.as_deref())?;
    let query = parse_query(req)?;
    let format = parse_format_query(&query)?;

    let body = req.text().await?;
    let request = parse_invoice_request(&body)?;
    let response = build_invoice_response(request, state.rules.as_ref(), Utc::now())?;
    worker::console_log!(
        "extracted {} line item(s) with layout {} ({} warning(s))",
        response.invoice.invoice_items.len(),
        response.layout,
        response.warnings.len()
    );

    match format {
        ResponseFormat::Json => Ok(json_response(&response)?),
        ResponseFormat::Csv => csv_response(&response.invoice),
    }
}

fn csv_response(invoice: &Invoice) -> Result<Response, ApiError> {
    let csv = line_items_csv(invoice)?;
    let mut response = Response::ok(csv)?;
    response
        .headers_mut()
        .set("Content-Type", "text/csv; charset=utf-8")?;
    response.headers_mut().set(
        "Content-Disposition",
        "inline; filename=\"invoice-items.csv\"",
    )?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

pub fn ensure_json_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    let is_json = content_type.is_some_and(|value| {
        value
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
    });
    if is_json {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "only application/json is accepted".to_string(),
        ))
    }
}

pub fn parse_layout_query(query: &HashMap<String, String>) -> Result<LayoutId, ApiError> {
    let Some(raw) = query.get("layout") else {
        return Ok(LayoutId::default());
    };
    raw.parse::<LayoutId>().map_err(ApiError::BadRequest)
}

pub fn parse_format_query(query: &HashMap<String, String>) -> Result<ResponseFormat, ApiError> {
    match query
        .get("format")
        .map(|value| value.trim().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("json") => Ok(ResponseFormat::Json),
        Some("csv") => Ok(ResponseFormat::Csv),
        Some(other) => Err(ApiError::BadRequest(format!(
            "unknown format '{other}', expected json or csv"
        ))),
    }
}

pub fn parse_invoice_request(body: &str) -> Result<InvoiceRequest, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("empty body".to_string()));
    }
    let request: InvoiceRequest = serde_json::from_str(body)?;
    if request.regions.is_empty() {
        return Err(ApiError::BadRequest(
            "request has no recognized regions".to_string(),
        ));
    }
    Ok(request)
}

pub fn build_invoice_response(
    request: InvoiceRequest,
    rules: Option<&LayoutRules>,
    now: DateTime<Utc>,
) -> Result<InvoiceResponse, ApiError> {
    let mut options = ExtractOptions::default();
    if let Some(layout) = request.layout {
        options = options.with_layout(LayoutMode::Fixed(layout));
    }
    if let Some(rules) = rules {
        options = options.with_rules(rules.clone());
    }

    let recorded = RecordedOcr::new(request.regions);
    let (invoice, report) = extract_invoice(&recorded, &options)?;

    Ok(InvoiceResponse {
        invoice,
        layout: report.layout,
        warnings: report.warnings,
        extracted_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

pub fn regions_response(layout: LayoutId) -> RegionsResponse {
    RegionsResponse {
        layout,
        regions: regions(layout),
    }
}

pub fn line_items_csv(invoice: &Invoice) -> Result<String, ApiError> {
    Ok(write_csv_to_string(&invoice.invoice_items)?)
}
