//! Developer CLI: quote an inquiry CSV against a price catalog CSV.
//!
//! Production ingestion (spreadsheets, OCR) lives in the hosting service;
//! this binary reads plain CSV through Arrow for local runs and prints the
//! quoted sheet.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use clap::Parser;

use valvequote_catalog::{catalog_from_batches, inquiry_from_batches};
use valvequote_extract::MemoryRuleRepository;
use valvequote_quote::{LineItem, QuoteEngine, batch_total};

#[derive(Parser)]
#[command(name = "valvequote", about = "Quote an inquiry sheet against a price catalog")]
struct Args {
    /// Price catalog CSV (model/specification/brand/price columns).
    #[arg(long)]
    catalog: PathBuf,

    /// Inquiry sheet CSV (product name, specification, quantity).
    #[arg(long)]
    inquiry: PathBuf,

    /// Customer id for rule-document lookup.
    #[arg(long, default_value = "default")]
    customer: String,

    /// Restrict matching to one brand.
    #[arg(long)]
    brand: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("valvequote v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let catalog = catalog_from_batches(&read_csv(&args.catalog)?)?;
    let inquiry = inquiry_from_batches(&read_csv(&args.inquiry)?)?;

    let engine = QuoteEngine::new(MemoryRuleRepository::new());
    let items = engine.quote_batch(&args.customer, &inquiry, &catalog, args.brand.as_deref());

    let table = items_to_batch(&items)?;
    println!("{}", arrow::util::pretty::pretty_format_batches(&[table])?);
    println!("合计: ¥{:.2}", batch_total(&items));
    Ok(())
}

fn read_csv(path: &Path) -> anyhow::Result<Vec<RecordBatch>> {
    let mut file = File::open(path)?;
    let format = arrow::csv::reader::Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, Some(100))?;

    let file = File::open(path)?;
    let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .build(file)?;
    Ok(reader.collect::<Result<Vec<_>, _>>()?)
}

fn items_to_batch(items: &[LineItem]) -> anyhow::Result<RecordBatch> {
    let names: StringArray = items.iter().map(|i| Some(i.name.as_str())).collect();
    let specs: StringArray = items
        .iter()
        .map(|i| Some(i.specification.as_str()))
        .collect();
    let quantities: StringArray = items.iter().map(|i| Some(i.quantity.as_str())).collect();
    let codes: StringArray = items.iter().map(|i| i.code.as_deref()).collect();
    let models: StringArray = items.iter().map(|i| Some(i.matched.model.as_str())).collect();
    let brands: StringArray = items.iter().map(|i| Some(i.matched.brand.as_str())).collect();
    let unit_prices = Float64Array::from_iter_values(items.iter().map(|i| i.unit_price));
    let totals = Float64Array::from_iter_values(items.iter().map(|i| i.total));
    let statuses: StringArray = items.iter().map(|i| Some(i.status.as_str())).collect();

    let batch = RecordBatch::try_from_iter(vec![
        ("品名", Arc::new(names) as ArrayRef),
        ("规格型号", Arc::new(specs) as ArrayRef),
        ("数量", Arc::new(quantities) as ArrayRef),
        ("标准型号", Arc::new(codes) as ArrayRef),
        ("匹配型号", Arc::new(models) as ArrayRef),
        ("品牌", Arc::new(brands) as ArrayRef),
        ("单价", Arc::new(unit_prices) as ArrayRef),
        ("总价", Arc::new(totals) as ArrayRef),
        ("状态", Arc::new(statuses) as ArrayRef),
    ])?;
    Ok(batch)
}
