//! Instrument codes
//!
//! Clients address a futures contract as a product `symbol` plus a
//! `contract` month (`rb` + `2501`); the broker uses one concatenated code
//! (`rb2501`). The boundary is the first non-alphabetic character, which
//! holds for the exchange naming schemes the gateway trades (`IF2503`,
//! `SR501`, `m2505-C-3000`).

/// Concatenate a symbol and contract into a wire instrument code
pub fn join_instrument(symbol: &str, contract: &str) -> String {
    format!("{symbol}{contract}")
}

/// Split a wire instrument code into `(symbol, contract)`
pub fn split_instrument(code: &str) -> (&str, &str) {
    let boundary = code
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(code.len());
    code.split_at(boundary)
}
