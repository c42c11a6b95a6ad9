use shopfront_core::state::Intent;

/// Map a classified intent onto the handler node that owns it. Total over
/// the closed intent set; the enum makes the "unrecognized tag" arm of the
/// original contract unrepresentable, so product search is simply the
/// fourth branch rather than a catch-all.
pub fn route(intent: Intent) -> &'static str {
    match intent {
        Intent::OrderCreation => "order_creation",
        Intent::OrderStatus => "order_status",
        Intent::InfoSearch => "info_search",
        Intent::ProductSearch => "product_search",
    }
}
