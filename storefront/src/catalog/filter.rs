//! Client-side (residual) filtering

use shared::models::{FilterDimension, FilterSelection, Product};

use crate::config::FlagConfig;

/// Whether `product` satisfies the selection on `dimensions`
///
/// Categorical dimensions require the product's value to be selected.
/// A flag dimension only constrains when its "true" value is selected;
/// selecting only the "false" value is treated as no constraint.
pub fn matches(
    product: &Product,
    selection: &FilterSelection,
    dimensions: &[FilterDimension],
    flags: &FlagConfig,
) -> bool {
    dimensions.iter().all(|&dimension| {
        let Some(selected) = selection.get(dimension) else {
            return true;
        };
        if selected.is_empty() {
            return true;
        }
        match product.flag(dimension) {
            Some(value) => !selected.contains(&flags.true_value) || value,
            None => product
                .spec(dimension)
                .is_some_and(|value| selected.contains(value)),
        }
    })
}

/// Keep products matching every dimension of the selection
pub fn apply_filters(
    products: Vec<Product>,
    selection: &FilterSelection,
    flags: &FlagConfig,
) -> Vec<Product> {
    apply_residual(products, selection, &FilterDimension::ALL, flags)
}

/// Keep products matching the selection on the given dimensions only
pub fn apply_residual(
    products: Vec<Product>,
    selection: &FilterSelection,
    dimensions: &[FilterDimension],
    flags: &FlagConfig,
) -> Vec<Product> {
    if dimensions.is_empty() || selection.is_empty() {
        return products;
    }
    products
        .into_iter()
        .filter(|p| matches(p, selection, dimensions, flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use shared::models::ProductRow;

    fn product(id: &str, form_factor: &str, copilot: bool) -> Product {
        Product::from(ProductRow {
            id: id.into(),
            name: id.into(),
            form_factor: Some(form_factor.into()),
            copilot: Some(copilot),
            ..Default::default()
        })
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("a", "Laptop", true),
            product("b", "Laptop", false),
            product("c", "Tablet", true),
        ]
    }

    #[test]
    fn test_categorical_membership() {
        let flags = CatalogConfig::default().flags;
        let selection = FilterSelection::new().with(FilterDimension::FormFactor, ["Laptop"]);
        assert_eq!(ids(&apply_filters(catalog(), &selection, &flags)), ["a", "b"]);

        // Products lacking the field never match a constrained dimension
        let selection = FilterSelection::new().with(FilterDimension::Memory, ["16GB"]);
        assert!(apply_filters(catalog(), &selection, &flags).is_empty());
    }

    #[test]
    fn test_flag_true_constrains() {
        let flags = CatalogConfig::default().flags;
        let selection = FilterSelection::new().with(FilterDimension::Copilot, ["true"]);
        assert_eq!(ids(&apply_filters(catalog(), &selection, &flags)), ["a", "c"]);

        let selection = FilterSelection::new().with(FilterDimension::Copilot, ["true", "false"]);
        assert_eq!(ids(&apply_filters(catalog(), &selection, &flags)), ["a", "c"]);
    }

    #[test]
    fn test_flag_false_alone_is_unconstrained() {
        let flags = CatalogConfig::default().flags;
        let selection = FilterSelection::new().with(FilterDimension::Copilot, ["false"]);
        assert_eq!(ids(&apply_filters(catalog(), &selection, &flags)), ["a", "b", "c"]);
    }

    #[test]
    fn test_residual_skips_pushed_dimensions() {
        let flags = CatalogConfig::default().flags;
        let selection = FilterSelection::new()
            .with(FilterDimension::FormFactor, ["Desktop"])
            .with(FilterDimension::Copilot, ["true"]);
        let kept = apply_residual(catalog(), &selection, &FilterDimension::FLAGS, &flags);
        assert_eq!(ids(&kept), ["a", "c"]);
    }
}
