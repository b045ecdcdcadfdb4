//! Category listing command.

use std::io::Write;

use shopfront_storefront::Storefront;
use shopfront_storefront::stores::SelectOption;

use super::Result;

/// Print every category as `<id>  <name>`.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn list(storefront: &Storefront, out: &mut impl Write) -> Result<()> {
    storefront.categories().load().await;
    render(&storefront.categories().options(), out)?;
    Ok(())
}

/// Render category options.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render(options: &[SelectOption], out: &mut impl Write) -> std::io::Result<()> {
    if options.is_empty() {
        return writeln!(out, "No categories");
    }
    for option in options {
        writeln!(out, "{:>4}  {}", option.key, option.value)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options() {
        let options = [
            SelectOption {
                key: "1".to_string(),
                value: "Chairs".to_string(),
            },
            SelectOption {
                key: "12".to_string(),
                value: "Unnamed Category".to_string(),
            },
        ];
        let mut out = Vec::new();
        render(&options, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "   1  Chairs\n  12  Unnamed Category\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let mut out = Vec::new();
        render(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No categories\n");
    }
}
