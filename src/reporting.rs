//! Reporting and output formatting module
//! Renders a calculated pack distribution for the console

use std::fmt;

use crate::models::PackResponse;

/// Boxed console report of a single calculation
pub struct CalculationReport<'a>(pub &'a PackResponse);

impl fmt::Display for CalculationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.0;
        let sizes: Vec<String> = response.pack_sizes_used.iter().map(u64::to_string).collect();

        writeln!(f, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(f, "║                       PACK CALCULATION                       ║")?;
        writeln!(f, "╚══════════════════════════════════════════════════════════════╝\n")?;

        writeln!(f, "Quantity ordered: {}", response.quantity)?;
        writeln!(f, "Pack sizes:       {}", sizes.join(", "))?;

        writeln!(f, "\nPacks to ship:")?;
        if response.pack_breakdown.is_empty() {
            writeln!(f, "  (none)")?;
        }
        // Largest packs first
        for (size, count) in response.pack_breakdown.iter().rev() {
            writeln!(f, "  {:>4} x {}", count, size)?;
        }

        writeln!(
            f,
            "\nTotal items: {} ({} over the order)",
            response.total_items,
            response.overshipment()
        )?;
        writeln!(f, "Total packs: {}", response.total_packs)
    }
}

/// Render a calculation as a boxed console report
pub fn format_calculation(response: &PackResponse) -> String {
    CalculationReport(response).to_string()
}

/// Display a calculation on stdout
pub fn display_calculation(response: &PackResponse) {
    print!("{}", CalculationReport(response));
}
