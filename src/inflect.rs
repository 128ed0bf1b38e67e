//! String inflection helpers.
//!
//! Simple English rules, sufficient for deriving resource paths from model
//! names (`Comment` → `comments`) and association target types from field
//! names (`comments` → `Comment`). Irregular nouns are out of scope; models
//! with awkward names can always declare an explicit URI template.

/// Converts `PascalCase` to `snake_case`.
#[must_use]
pub fn underscore(name: &str) -> String {
    let mut result = String::new();
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Converts `snake_case` to `PascalCase`.
#[must_use]
pub fn camelize(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

/// Computes a plural form.
#[must_use]
pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') || name.ends_with("sh") || name.ends_with("ch") || name.ends_with('x') {
        format!("{name}es")
    } else if name.ends_with('y')
        && !name.ends_with("ey")
        && !name.ends_with("ay")
        && !name.ends_with("oy")
    {
        format!("{}ies", &name[..name.len() - 1])
    } else {
        format!("{name}s")
    }
}

/// Computes a singular form; the inverse of [`pluralize`].
#[must_use]
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{stem}y")
    } else if name.ends_with("shes") || name.ends_with("ches") || name.ends_with("sses") {
        name[..name.len() - 2].to_string()
    } else if let Some(stem) = name.strip_suffix("xes") {
        format!("{stem}x")
    } else if name.ends_with('s') && !name.ends_with("ss") {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}
