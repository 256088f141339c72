use sqlx::{Postgres, QueryBuilder};

use encore_core::search::SEARCH_RADIUS_KM;
use encore_shared::{GeoPoint, Location};

/// Escapes LIKE wildcards so user input matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// Great-circle distance in km between the row's columns and `point`.
/// The haversine term is capped at 1 so rounding near antipodes stays in asin's domain.
pub fn push_distance(qb: &mut QueryBuilder<'_, Postgres>, lng_col: &str, lat_col: &str, point: GeoPoint) {
    qb.push("(6371.0 * 2 * asin(least(1.0, sqrt(power(sin(radians(")
        .push(lat_col)
        .push(" - ")
        .push_bind(point.lat())
        .push(") / 2), 2) + cos(radians(")
        .push_bind(point.lat())
        .push(")) * cos(radians(")
        .push(lat_col)
        .push(")) * power(sin(radians(")
        .push(lng_col)
        .push(" - ")
        .push_bind(point.lng())
        .push(") / 2), 2)))))");
}

pub fn push_within_radius(qb: &mut QueryBuilder<'_, Postgres>, lng_col: &str, lat_col: &str, point: GeoPoint) {
    qb.push(" AND ");
    push_distance(qb, lng_col, lat_col, point);
    qb.push(" <= ").push_bind(SEARCH_RADIUS_KM);
}

/// ` AND (a ILIKE t1 OR b ILIKE t1 OR ...)` over every term; nothing when empty.
/// A column written as `unnest(col)` matches any element of a text array.
pub fn push_any_term(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], terms: &[String]) {
    if terms.is_empty() {
        return;
    }
    qb.push(" AND (");
    let mut first = true;
    for term in terms {
        for column in columns {
            if !first {
                qb.push(" OR ");
            }
            first = false;
            match column.strip_prefix("unnest(").and_then(|c| c.strip_suffix(')')) {
                Some(array) => {
                    qb.push("EXISTS (SELECT 1 FROM unnest(")
                        .push(array)
                        .push(") AS n WHERE n ILIKE ")
                        .push_bind(contains_pattern(term))
                        .push(")");
                }
                None => {
                    qb.push(*column).push(" ILIKE ").push_bind(contains_pattern(term));
                }
            }
        }
    }
    qb.push(")");
}

pub fn push_any_typology(qb: &mut QueryBuilder<'_, Postgres>, typologies: &[String]) {
    if typologies.is_empty() {
        return;
    }
    qb.push(" AND typologies && ").push_bind(typologies.to_vec());
}

pub fn location(address: String, lng: f64, lat: f64) -> Location {
    Location::new(GeoPoint::new(lng, lat), address)
}
