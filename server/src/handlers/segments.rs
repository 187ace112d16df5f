//! Segment evaluation handler.

use crate::error::{AppError, Result};
use catalog_engine::{compile, evaluate_condition, Clause, LocalProduct, ProductStore};
use serde::{Deserialize, Serialize};

/// Request body for segment evaluation.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Free-text condition, e.g. `on sale price < 50`
    #[serde(default)]
    pub conditions: Option<String>,
}

/// Response for segment evaluation.
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub conditions: String,
    pub count: usize,
    /// Clauses recognised in the text
    pub clauses: Vec<Clause>,
    pub products: Vec<LocalProduct>,
}

/// Compile the request's conditions and run them against the store.
pub async fn handle_evaluate(
    store: &dyn ProductStore,
    request: EvaluateRequest,
) -> Result<EvaluateResponse> {
    let conditions = request
        .conditions
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Conditions are required".to_string()))?;

    let condition = compile(&conditions);
    let products = evaluate_condition(store, &condition).await?;

    Ok(EvaluateResponse {
        conditions,
        count: products.len(),
        clauses: condition.clauses().to_vec(),
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_engine::MemoryStore;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn store() -> MemoryStore {
        let mut a = LocalProduct::new(1, "A");
        a.price = Decimal::from(20);
        a.on_sale = true;
        a.category = "Shoes".into();

        let mut b = LocalProduct::new(2, "B");
        b.price = Decimal::from(80);
        b.category = "Hats".into();

        MemoryStore::with_products([a, b])
    }

    fn request(conditions: Option<&str>) -> EvaluateRequest {
        EvaluateRequest {
            conditions: conditions.map(String::from),
        }
    }

    #[tokio::test]
    async fn evaluates_conditions() {
        let response = handle_evaluate(&store(), request(Some("on sale price < 50")))
            .await
            .unwrap();

        assert_eq!(response.count, 1);
        assert_eq!(response.products[0].id, 1);
        assert_eq!(response.clauses.len(), 2);
        assert_eq!(response.conditions, "on sale price < 50");
    }

    #[tokio::test]
    async fn unrecognised_text_returns_everything() {
        let response = handle_evaluate(&store(), request(Some("whatever")))
            .await
            .unwrap();
        assert_eq!(response.count, 2);
        assert!(response.clauses.is_empty());
    }

    #[tokio::test]
    async fn whitespace_conditions_return_everything() {
        let response = handle_evaluate(&store(), request(Some("   ")))
            .await
            .unwrap();
        assert_eq!(response.count, 2);
        assert!(response.clauses.is_empty());
    }

    #[tokio::test]
    async fn missing_or_empty_conditions_are_rejected() {
        for conditions in [None, Some("")] {
            let err = handle_evaluate(&store(), request(conditions))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[test]
    fn request_tolerates_missing_field() {
        let request: EvaluateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.conditions.is_none());
    }
}
