use sqlx::{types::Json, Postgres, QueryBuilder};

use crate::db::live_query::{Filter, FilterOp};

// ---
// Helper: traduz os filtros do contrato "live query" para SQL sobre JSONB
// ---
/// Acrescenta `AND data -> 'campo' = valor` (ou `<>`) para cada filtro.
/// Os valores são comparados como `jsonb`, então `false` e `"false"` diferem.
pub(crate) fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for filter in filters {
        builder.push(" AND data -> ");
        builder.push_bind(filter.field.clone());
        match filter.op {
            FilterOp::Eq => {
                builder.push(" = ");
            }
            FilterOp::Ne => {
                // Campo ausente não casa com `<>` (mesma semântica do store em memória)
                builder.push(" <> ");
            }
        }
        builder.push_bind(Json(filter.value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_clause_per_filter() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM documents WHERE collection = ");
        builder.push_bind("stock_alerts");
        push_filters(
            &mut builder,
            &[Filter::eq("secteurId", "f1"), Filter::ne("acknowledged", true)],
        );
        assert_eq!(
            builder.sql(),
            "SELECT id FROM documents WHERE collection = $1 AND data -> $2 = $3 AND data -> $4 <> $5"
        );
    }
}
