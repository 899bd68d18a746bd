//! Minimal fixed-width table rendering for report rows.
//!
//! Columns are sized to their widest cell; numeric-looking cells are the
//! caller's concern (they arrive pre-formatted as strings).

pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    render_line(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    render_line(
        &mut out,
        widths.iter().map(|w| "-".repeat(*w)),
        &widths,
    );
    for row in rows {
        render_line(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn render_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let rendered: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(rendered.join("  ").trim_end());
    out.push('\n');
}
