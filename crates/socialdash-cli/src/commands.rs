use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;
use socialdash_client::{AnalyticsClient, UploadFile};
use socialdash_core::{
    load_products_or_default, AppConfig, DateRange, FilterParameters, PageRequest, Pagination,
    ProductsFile, TimeSeriesMetric,
};
use socialdash_dashboard::{Dashboard, DashboardSettings};

use crate::FilterArgs;

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_catalogue(config: &AppConfig) -> anyhow::Result<ProductsFile> {
    load_products_or_default(&config.products_path).with_context(|| {
        format!(
            "failed to load products from {}",
            config.products_path.display()
        )
    })
}

fn resolve_product(
    catalogue: &ProductsFile,
    config: &AppConfig,
    args: &FilterArgs,
) -> anyhow::Result<String> {
    let id = args
        .product
        .clone()
        .unwrap_or_else(|| config.default_product.clone());
    if catalogue.find(&id).is_none() {
        let known: Vec<&str> = catalogue.products.iter().map(|p| p.id.as_str()).collect();
        anyhow::bail!("unknown product '{id}'; expected one of {}", known.join(", "));
    }
    Ok(id)
}

fn date_range(args: &FilterArgs) -> Option<DateRange> {
    match (args.from, args.to) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)),
        _ => None,
    }
}

fn filters(config: &AppConfig, args: &FilterArgs) -> anyhow::Result<FilterParameters> {
    let catalogue = load_catalogue(config)?;
    let product = resolve_product(&catalogue, config, args)?;
    Ok(FilterParameters::new(product).with_date_range(date_range(args)))
}

fn build_dashboard(config: &AppConfig, product: Option<String>) -> anyhow::Result<Dashboard> {
    let catalogue = load_catalogue(config)?;
    let client = AnalyticsClient::new(config)?;
    let mut settings = DashboardSettings::from_config(config);
    if let Some(product) = product {
        settings.default_product = product;
    }
    Ok(Dashboard::new(client, catalogue, settings)?)
}

pub(crate) fn products(config: &AppConfig) -> anyhow::Result<()> {
    let catalogue = load_catalogue(config)?;
    print_json(&catalogue.products)
}

pub(crate) async fn snapshot(
    config: &AppConfig,
    args: &FilterArgs,
    metric: Option<TimeSeriesMetric>,
    page: Option<u32>,
) -> anyhow::Result<()> {
    let filters = filters(config, args)?;
    let dashboard = build_dashboard(config, Some(filters.product_type.clone()))?;

    let report = match filters.date_range() {
        Some(range) => dashboard.set_date_range(Some(range)).await,
        None => None,
    };
    let report = match report {
        Some(report) => report,
        None => dashboard.load().await,
    };
    if let Some(metric) = metric {
        dashboard.select_metric(metric).await;
    }
    if let Some(page) = page {
        if dashboard.go_to_page(page).await.is_none() && page != 1 {
            tracing::warn!(page, "requested page is out of range; showing page 1");
        }
    }

    let params = dashboard.snapshot().await;
    let slots = dashboard.slots().await;
    let pager = dashboard.pagination().await;
    print_json(&json!({
        "filters": params.filters,
        "metric": params.metric,
        "page": params.page,
        "pages": pager.last_page(),
        "cards": slots.cards(),
        "panels": slots,
        "failures": report.failed,
    }))
}

pub(crate) async fn posts(config: &AppConfig, args: &FilterArgs, page: u32) -> anyhow::Result<()> {
    let filters = filters(config, args)?;
    let client = AnalyticsClient::new(config)?;
    let request = PageRequest::first(config.page_size).with_number(page.max(1));
    let result = client.post_page(&filters, request).await?;
    let pager = Pagination::new(request, Some(result.total_posts));
    print_json(&json!({
        "page": request.number,
        "pages": pager.last_page(),
        "totalPosts": result.total_posts,
        "posts": result.posts,
    }))
}

pub(crate) async fn metrics(config: &AppConfig, args: &FilterArgs) -> anyhow::Result<()> {
    let filters = filters(config, args)?;
    let client = AnalyticsClient::new(config)?;
    print_json(&client.metrics(&filters).await?)
}

pub(crate) async fn content_engagement(
    config: &AppConfig,
    args: &FilterArgs,
) -> anyhow::Result<()> {
    let filters = filters(config, args)?;
    let client = AnalyticsClient::new(config)?;
    print_json(&client.content_engagement(&filters).await?)
}

pub(crate) async fn search(
    config: &AppConfig,
    keyword: &str,
    args: &FilterArgs,
) -> anyhow::Result<()> {
    let filters = filters(config, args)?;
    let dashboard = build_dashboard(config, Some(filters.product_type.clone()))?;
    dashboard.search().set_scope(filters.search_scope()).await;
    dashboard.search().input(keyword).await;
    print_json(&dashboard.search().view().await)
}

pub(crate) async fn upload(config: &AppConfig, paths: &[PathBuf]) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(UploadFile::from_path(path).await?);
    }
    let dashboard = build_dashboard(config, None)?;
    let outcome = dashboard.upload(&files).await?;
    print_json(&json!({
        "files": outcome.report.files,
        "allSucceeded": outcome.report.all_succeeded(),
        "refreshed": outcome.refresh.is_some(),
    }))?;
    if !outcome.report.all_succeeded() {
        anyhow::bail!("{} file(s) failed to upload", outcome.report.failures().len());
    }
    Ok(())
}
