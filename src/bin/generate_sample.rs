use anyhow::{Context, Result};

use data_sweeper::data::clean::CleanOptions;
use data_sweeper::data::export::{export, ExportFormat};
use data_sweeper::data::model::{Cell, Column, FileDescriptor, Table};
use data_sweeper::data::pipeline::{process_batch, ConversionRequest, FileOperations};

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng(u64);

impl SimpleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Sales records with a few repeated rows and gaps in the numeric columns.
fn sample_table(rows: usize, rng: &mut SimpleRng) -> Result<Table> {
    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Doohickey"];

    let mut region: Vec<Cell> = Vec::with_capacity(rows);
    let mut product: Vec<Cell> = Vec::with_capacity(rows);
    let mut units: Vec<Cell> = Vec::with_capacity(rows);
    let mut price: Vec<Cell> = Vec::with_capacity(rows);
    let mut returned: Vec<Cell> = Vec::with_capacity(rows);

    for i in 0..rows {
        // Every seventh row repeats the one before it.
        if i % 7 == 6 {
            region.push(region[i - 1].clone());
            product.push(product[i - 1].clone());
            units.push(units[i - 1].clone());
            price.push(price[i - 1].clone());
            returned.push(returned[i - 1].clone());
            continue;
        }

        region.push(Cell::Text(regions[rng.below(4) as usize].to_string()));
        product.push(Cell::Text(products[rng.below(3) as usize].to_string()));
        units.push(if rng.below(10) == 0 {
            Cell::Missing
        } else {
            Cell::Number((1 + rng.below(50)) as f64)
        });
        price.push(if rng.below(8) == 0 {
            Cell::Missing
        } else {
            Cell::Number((199 + rng.below(2000)) as f64 / 100.0)
        });
        returned.push(Cell::Boolean(rng.below(5) == 0));
    }

    Ok(Table::new(vec![
        Column::new("region", region),
        Column::new("product", product),
        Column::new("units", units),
        Column::new("price", price),
        Column::new("returned", returned),
    ])?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut rng = SimpleRng(42);
    let table = sample_table(40, &mut rng)?;

    let mut written = Vec::new();
    for format in ExportFormat::ALL {
        let result = export(&table, format, "sample_data.csv")?;
        std::fs::write(&result.file_name, &result.bytes)
            .with_context(|| format!("writing {}", result.file_name))?;
        println!("Wrote {} rows to {}", table.n_rows(), result.file_name);
        written.push(FileDescriptor::new(result.file_name, result.bytes));
    }

    // Convert the samples back the other way, cleaned, plus one file that
    // cannot be read, to show per-file reporting.
    let mut requests: Vec<ConversionRequest> = written
        .into_iter()
        .map(|file| {
            let format = if file.extension() == ".csv" {
                ExportFormat::Excel
            } else {
                ExportFormat::Csv
            };
            ConversionRequest {
                file,
                operations: FileOperations {
                    clean: CleanOptions {
                        deduplicate: true,
                        impute_missing: true,
                    },
                    columns: Some(vec!["product".into(), "units".into(), "price".into()]),
                    format,
                },
            }
        })
        .collect();
    requests.push(ConversionRequest {
        file: FileDescriptor::new("notes.pdf", b"%PDF-1.4".to_vec()),
        operations: FileOperations::default(),
    });

    for report in process_batch(&requests) {
        match report.outcome {
            Ok(result) => println!(
                "{} → {} ({} bytes, {})",
                report.file_name,
                result.file_name,
                result.bytes.len(),
                result.mime_type
            ),
            Err(e) => println!("{}: {e}", report.file_name),
        }
    }

    Ok(())
}
