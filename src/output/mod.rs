pub mod formatter;

pub use formatter::{
    format_explanation, format_metric_catalog, format_ranked_table, format_score, format_tsv,
    should_use_colors,
};
