//! Print the built-in menu.

use std::fmt::Write as _;

use enzi_core::{Catalog, Category, format_usd};

/// Render the catalog as a plain-text menu board, grouped by category.
#[must_use]
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();
    for category in catalog.categories() {
        let _ = writeln!(out, "{}", heading(category));
        for item in catalog.declared().iter().filter(|i| i.category == category) {
            let marker = if item.available { "" } else { "  (unavailable)" };
            let _ = writeln!(
                out,
                "  {:>2}  {:<12} {:>7}{marker}",
                item.id.as_i32(),
                item.name,
                format_usd(item.price)
            );
        }
    }
    out
}

const fn heading(category: Category) -> &'static str {
    match category {
        Category::Hot => "Hot",
        Category::Cold => "Cold",
        Category::Espresso => "Espresso",
    }
}

/// Print the built-in catalog to stdout.
pub fn print() {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&Catalog::builtin()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_item() {
        let catalog = Catalog::builtin();
        let board = render(&catalog);

        for item in catalog.declared() {
            let line = format!("{:>2}  {}", item.id.as_i32(), item.name);
            assert!(board.contains(&line), "missing {line}");
        }
        let item_lines = board.lines().filter(|l| l.starts_with("  ")).count();
        assert_eq!(item_lines, catalog.declared().len());
        assert!(board.contains("$2.50"));
    }

    #[test]
    fn test_render_starts_with_first_category() {
        let catalog = Catalog::builtin();
        let first = catalog.categories().first().copied();
        assert!(first.is_some_and(|c| render(&catalog).starts_with(heading(c))));
    }
}
