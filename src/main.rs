// Interactive terminal front end.
//
// The dataset is loaded once at startup; a load failure ends the process
// before any menu is shown. After that every filter change recomputes the
// whole view from the cached dataset.
use deficiency_dashboard::config::AppConfig;
use deficiency_dashboard::output;
use deficiency_dashboard::util::{format_int, parse_indices};
use deficiency_dashboard::{
    build_view, derive_options, Dataset, DatasetProvider, Dimension, FilterOptions,
    FilterSelection,
};
use log::error;
use std::io::{self, Write};
use std::process::ExitCode;

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn describe_selection(selection: &FilterSelection, dimension: Dimension) -> String {
    match selection.accepted(dimension) {
        None => "(all)".to_string(),
        Some(values) => values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Print the KPI tiles, both charts and the row preview.
fn handle_show(dataset: &Dataset, selection: &FilterSelection, cfg: &AppConfig) {
    let view = build_view(dataset, selection);

    println!("\nDeficiency Management Dashboard");
    println!("Executive overview of control deficiencies\n");
    if !selection.is_unfiltered() {
        for (dimension, _) in selection.active() {
            println!("  {dimension}: {}", describe_selection(selection, dimension));
        }
        println!();
    }

    println!("{}\n", output::render_metrics(&view.metrics));

    println!("Issues by Business Segment\n");
    println!("{}", output::render_segment_chart(&view.aggregates.segment_type_counts));

    println!("Issues Trend by Year\n");
    println!("{}", output::render_year_trend(&view.aggregates.year_counts));

    println!(
        "Detailed Issue List ({} of {} rows)\n",
        format_int(view.rows.len().min(cfg.preview_rows)),
        format_int(view.rows.len())
    );
    println!("{}\n", output::render_rows(&view.rows, cfg.preview_rows));
}

/// Pick a dimension, then pick its accepted values. A blank answer clears it.
fn handle_set_filter(options: &FilterOptions, selection: &mut FilterSelection) {
    println!();
    for (i, dimension) in Dimension::ALL.iter().enumerate() {
        println!(
            "[{}] {dimension}: {}",
            i + 1,
            describe_selection(selection, *dimension)
        );
    }
    let Some(choice) = read_line("Filter which column: ") else {
        return;
    };
    let dimension = match parse_indices(&choice, Dimension::ALL.len()).as_deref() {
        Some([idx]) => Dimension::ALL[*idx],
        _ => {
            println!("Invalid choice.\n");
            return;
        }
    };

    let values = options.get(dimension);
    if values.is_empty() {
        println!("No values available for {dimension}.\n");
        return;
    }
    for (i, v) in values.iter().enumerate() {
        println!("  [{}] {v}", i + 1);
    }
    let Some(input) = read_line("Select values (e.g. 1,3; blank for all): ") else {
        return;
    };
    if input.is_empty() {
        selection.clear(dimension);
        println!("{dimension}: (all)\n");
        return;
    }
    match parse_indices(&input, values.len()) {
        Some(picked) => {
            selection.set(dimension, picked.into_iter().map(|i| values[i].clone()));
            println!("{dimension}: {}\n", describe_selection(selection, dimension));
        }
        None => println!("Invalid selection; {dimension} unchanged.\n"),
    }
}

fn handle_export(dataset: &Dataset, selection: &FilterSelection, cfg: &AppConfig) {
    let view = build_view(dataset, selection);
    match output::export_view(&cfg.export_dir, &view, selection) {
        Ok(paths) => {
            println!("Outputs saved:");
            for p in paths {
                println!("  {}", p.display());
            }
            println!();
        }
        Err(e) => {
            error!("export failed: {e}");
            eprintln!("Write error: {e}\n");
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = AppConfig::from_env();
    let provider = DatasetProvider::new(cfg.data_path.clone());
    let loaded = provider
        .load()
        .and_then(|data| provider.report().map(|report| (data, report)));
    let (dataset, report) = match loaded {
        Ok(v) => v,
        Err(e) => {
            error!("startup aborted: {e}");
            eprintln!("Failed to load file: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Processing dataset... ({} rows loaded from {})",
        format_int(report.total_rows),
        provider.path().display()
    );
    for (col, n) in &report.absent_cells {
        println!("Note: {} empty cell(s) in \"{col}\".", format_int(*n));
    }
    println!();

    let options = derive_options(&dataset);
    let mut selection = FilterSelection::new();

    loop {
        println!("[1] Show dashboard");
        println!("[2] Set filter");
        println!("[3] Clear filters");
        println!("[4] Export current view");
        println!("[5] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_show(&dataset, &selection, &cfg),
            "2" => handle_set_filter(&options, &mut selection),
            "3" => {
                selection.clear_all();
                println!("All filters cleared.\n");
            }
            "4" => handle_export(&dataset, &selection, &cfg),
            "5" => break,
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
    println!("Exiting the program.");
    ExitCode::SUCCESS
}
