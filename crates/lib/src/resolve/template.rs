//! Template lookup and instantiation.

use crate::{
    Result,
    resolve::ResolveError,
    scope::ScopeChain,
    tree::{Address, Value},
};

/// Merges `site` over `base`, recursing into maps present on both sides.
///
/// Keys of `base` keep their order; keys only found in `site` are appended.
/// On any other conflict the site value wins.
pub fn deep_merge(base: Value, site: Value) -> Value {
    match (base, site) {
        (Value::Map(mut base), Value::Map(site)) => {
            for (key, site_value) in site {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::take(slot);
                        *slot = deep_merge(base_value, site_value);
                    }
                    None => {
                        base.insert(key, site_value);
                    }
                }
            }
            Value::Map(base)
        }
        (_, site) => site,
    }
}

/// A copy of the template `name` visible from `address`, with `site` merged
/// over it when the site is a map.
pub(crate) fn instantiate(
    tree: &Value,
    name: &str,
    address: &Address,
    site: Option<Value>,
) -> Result<Value> {
    let found = ScopeChain::new(tree)
        .find_template(name, address)
        .ok_or_else(|| ResolveError::TemplateNotFound {
            name: name.to_string(),
            address: address.clone(),
        })?;
    tracing::debug!(%address, template = %found.address, "Instantiating template");

    let copy = found.value.clone();
    Ok(match site {
        Some(site @ Value::Map(_)) => deep_merge(copy, site),
        _ => copy,
    })
}
