use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\?").unwrap()
});

/// Collapses whitespace and rewrites `?` placeholders to Postgres `$n` form.
pub fn sql(query: &str) -> String {
    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let mut param_index = 1;
    let mut result = cleaned;
    while let Some(mat) = PLACEHOLDER.find(&result) {
        let replacement = format!("${}", param_index);
        result.replace_range(mat.range(), &replacement);
        param_index += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_placeholders_in_order() {
        let query = sql(r#"
            SELECT id
            FROM payruns
            WHERE company_id = ?
              AND period_month = ?
              AND period_year = ?
        "#);

        assert_eq!(
            query,
            "SELECT id FROM payruns WHERE company_id = $1 AND period_month = $2 AND period_year = $3"
        );
    }

    #[test]
    fn leaves_queries_without_placeholders_alone() {
        assert_eq!(sql("SELECT  1"), "SELECT 1");
    }
}
