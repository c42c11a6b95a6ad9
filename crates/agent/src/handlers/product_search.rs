//! Product search handler.
//!
//! Parses the message into a structured query with filters, builds the
//! catalog-search arguments, and then - in the default configuration -
//! bypasses the catalog entirely and returns a fixed two-item fixture.
//! The bypass ships enabled; the parsed filters and the LLM re-filtering
//! pass below only run against a live catalog when it is switched off.

use serde::Deserialize;
use serde_json::{json, Value};
use shopfront_core::extract::{extract, extract_json};
use tracing::debug;

use crate::llm::{generate_lenient, LlmClient};
use crate::tools::JsonRpcToolClient;

#[derive(Debug, Default, Deserialize)]
struct ParsedQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    filters: QueryFilters,
}

#[derive(Debug, Default, Deserialize)]
struct QueryFilters {
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    availability: Option<bool>,
    #[serde(default)]
    sizes: Vec<String>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    design: Vec<String>,
}

pub async fn run(
    llm: &dyn LlmClient,
    catalog: Option<&JsonRpcToolClient>,
    bypass: bool,
    user_message: &str,
) -> Value {
    let parsed = parse_query(llm, user_message).await;
    let query =
        if parsed.query.trim().is_empty() { user_message } else { parsed.query.as_str() };

    let mut arguments = json!({
        "query": query,
        "context": search_context(user_message),
    });
    if let Some(price) = &parsed.filters.price {
        if price.is_object() {
            arguments["price"] = price.clone();
        }
    }
    if let Some(availability) = parsed.filters.availability {
        arguments["availability"] = json!(availability);
    }

    debug!(
        query,
        designs = parsed.filters.design.len(),
        sizes = parsed.filters.sizes.len(),
        colors = parsed.filters.colors.len(),
        bypass,
        "catalog search prepared"
    );

    if bypass {
        return fixture_products();
    }

    let Some(catalog) = catalog else {
        return json!({ "error": "Product search failed: catalog endpoint is not configured" });
    };

    let result = catalog.call_tool("search_shop_catalog", arguments).await;
    if let Some(error) = result.get("error") {
        let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        return json!({ "error": format!("Product search failed: {message}") });
    }

    let raw_products = result.get("products").and_then(Value::as_array).cloned().unwrap_or_default();
    if raw_products.is_empty() {
        return json!({
            "products": [],
            "debug": {
                "message": "No products returned from catalog search",
                "catalog_response": result,
            },
        });
    }

    let formatted = generate_lenient(llm, &filter_prompt(user_message, &raw_products)).await;
    match extract_json(&formatted) {
        Ok(filtered) => filtered,
        Err(error) => {
            debug!(error = %error, "catalog re-filtering unusable, returning raw products");
            json!({ "products": raw_products })
        }
    }
}

async fn parse_query(llm: &dyn LlmClient, user_message: &str) -> ParsedQuery {
    let raw = generate_lenient(llm, &parse_prompt(user_message)).await;
    match extract::<ParsedQuery>(&raw) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(error = %error, "query parse failed, searching with the raw message");
            ParsedQuery { query: user_message.to_string(), filters: QueryFilters::default() }
        }
    }
}

/// Fixed catalog fixture served while the external catalog is bypassed.
pub fn fixture_products() -> Value {
    json!({
        "products": [
            {
                "id": "prod_001",
                "title": "Premium Cotton T-Shirt",
                "product_type": "T-Shirts",
                "description": "Comfortable and breathable cotton t-shirt perfect for everyday wear",
                "variants": [
                    { "id": "var_001_s", "title": "Small / Blue", "price": "29.99", "available": true },
                    { "id": "var_001_m", "title": "Medium / Blue", "price": "29.99", "available": true },
                    { "id": "var_001_l", "title": "Large / Blue", "price": "29.99", "available": true },
                ],
                "images": [
                    { "id": "img_001", "src": "https://cdn.example.com/images/prod_001.jpg" },
                ],
            },
            {
                "id": "prod_002",
                "title": "Classic Denim Jeans",
                "product_type": "Jeans",
                "description": "Stylish and durable denim jeans with a modern fit",
                "variants": [
                    { "id": "var_002_30", "title": "Waist 30 / Dark Blue", "price": "59.99", "available": true },
                    { "id": "var_002_32", "title": "Waist 32 / Dark Blue", "price": "59.99", "available": true },
                    { "id": "var_002_34", "title": "Waist 34 / Dark Blue", "price": "59.99", "available": false },
                ],
                "images": [
                    { "id": "img_002", "src": "https://cdn.example.com/images/prod_002.jpg" },
                ],
            },
        ],
    })
}

fn search_context(user_message: &str) -> String {
    format!(
        "Search Query: {user_message}\n\
         Filtering Guidelines:\n\
         - Prioritize products that match the search terms in title, description, or tags\n\
         - For patterns (floral, striped, etc.): prefer products with matching patterns\n\
         - For product types: include relevant category matches\n\
         - For price constraints: filter by specified price ranges\n\
         - Return relevant products even if not exact matches\n\
         - Include similar or related products when appropriate"
    )
}

fn parse_prompt(user_message: &str) -> String {
    format!(
        "Extract structured shopping intent from the following message and return STRICT JSON only. \
         IMPORTANT: For pattern searches (floral, striped, etc.), include the pattern in BOTH 'query' and 'filters.design' fields.\n\
         Fields: query (full search text including patterns), filters.price {{min,max}}, filters.availability (true|false|null), \
         filters.sizes (array of strings), filters.colors (array of strings), filters.design (array of pattern keywords).\n\
         Message: '{user_message}'\n\
         Examples:\n\
         - 'floral shirts' -> {{\"query\":\"floral shirts\",\"filters\":{{\"design\":[\"floral\"]}}}}\n\
         - 'striped dresses under 2000' -> {{\"query\":\"striped dresses\",\"filters\":{{\"price\":{{\"max\":2000}},\"design\":[\"striped\"]}}}}\n\
         Output JSON:"
    )
}

fn filter_prompt(user_message: &str, raw_products: &[Value]) -> String {
    let raw =
        serde_json::to_string_pretty(raw_products).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are an intelligent product search assistant. Analyze the user query and filter the products based on ALL criteria mentioned.

User Query: "{user_message}"

INTELLIGENT FILTERING RULES:
1. PRICE FILTERING:
   - "under X", "below X", "less than X" -> include products where ALL variants <= X
   - "over X", "above X", "more than X" -> include products where ALL variants >= X
   - "between X and Y" -> include products where ALL variants are X <= price <= Y
   - "around X", "approximately X" -> include products within +/-20% of X

2. PATTERN/DESIGN FILTERING:
   - "floral", "striped", "polka dot", etc. -> match in title, description, or product type
   - Be flexible with variations (e.g., "flower" matches "floral")

3. PRODUCT TYPE FILTERING:
   - "shirts", "dresses", "earrings", etc. -> match product_type or title
   - Include related types (e.g., "tops" includes shirts, blouses, t-shirts)

4. COLOR FILTERING:
   - Match colors in title or variant titles
   - Include color variations (e.g., "blue" matches "navy", "royal blue")

5. SIZE FILTERING:
   - Match sizes in variant titles
   - Consider size ranges (S, M, L, XL, etc.)

6. AVAILABILITY FILTERING:
   - Only include products that appear to be available/in-stock

CRITICAL INSTRUCTIONS:
- Apply ALL filters mentioned in the user query
- Be strict but intelligent (use semantic understanding)
- If no products match ALL criteria, return empty products array
- Preserve original product structure exactly

Required JSON format:
{{
  "products": [
    {{
      "id": product_id,
      "title": "Product Title",
      "product_type": "Product Type",
      "variants": [
        {{
          "id": variant_id,
          "title": "Variant Title",
          "price": "Price"
        }}
      ],
      "images": [
        {{
          "id": image_id,
          "src": "image_url"
        }}
      ]
    }}
  ]
}}

Raw product data to filter: {raw}

Return ONLY the filtered JSON with products that match ALL criteria, no other text."#
    )
}
