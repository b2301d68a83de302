mod formatter;

pub use formatter::{
    format_score, format_stock_detail, format_stock_table, format_tsv, should_use_colors,
    ScoredStock,
};
