//! store::sql
//!
//! PostGIS statements used by [`PostgisStore`](super::postgis::PostgisStore).
//!
//! Every user-supplied value is a bind parameter (`$n`). The only text
//! spliced into statements is the schema name, the table names and the
//! SRID, and those are assembled at compile time with `concat!`, so no
//! runtime formatting ever touches SQL.
//!
//! Storage and queries share one reference system: EPSG:4326.

/// Schema holding both feature tables.
macro_rules! schema {
    () => {
        "public"
    };
}

/// Point feature table.
macro_rules! stadiums {
    () => {
        concat!(schema!(), ".us_stadiums")
    };
}

/// Region feature table.
macro_rules! states {
    () => {
        concat!(schema!(), ".us_states")
    };
}

/// Spatial reference identifier for stored and query geometries.
macro_rules! srid {
    () => {
        "4326"
    };
}

/// Status assigned to newly created point features.
pub const DEFAULT_STATUS: &str = "Open";

/// `$1` region name. Returns one `BIGINT`.
pub const COUNT_IN_REGION: &str = concat!(
    "SELECT COUNT(DISTINCT s.id) ",
    "FROM ",
    states!(),
    " t JOIN ",
    stadiums!(),
    " s ON ST_Contains(t.geom, s.geom) ",
    "WHERE t.name = $1"
);

/// No parameters. Left join so regions without points report 0.
pub const COUNT_PER_REGION: &str = concat!(
    "SELECT t.name AS region_name, COUNT(DISTINCT s.id) AS count ",
    "FROM ",
    states!(),
    " t LEFT JOIN ",
    stadiums!(),
    " s ON ST_Contains(t.geom, s.geom) ",
    "GROUP BY t.name ",
    "ORDER BY t.name"
);

/// `$1` longitude, `$2` latitude. Distance is geodesic, in kilometres.
pub const NEAREST_POINT: &str = concat!(
    "WITH q AS (SELECT ST_SetSRID(ST_MakePoint($1, $2), ",
    srid!(),
    ")::geography AS geog) ",
    "SELECT s.name, s.city, s.state AS region, ",
    "ST_Y(s.geom) AS lat, ST_X(s.geom) AS lng, ",
    "ST_Distance(s.geom::geography, q.geog) / 1000.0 AS distance_km ",
    "FROM ",
    stadiums!(),
    " s CROSS JOIN q ",
    "WHERE s.geom IS NOT NULL ",
    "ORDER BY s.geom::geography <-> q.geog, s.id ",
    "LIMIT 1"
);

/// `$1` escaped `ILIKE` pattern.
pub const SEARCH_POINTS: &str = concat!(
    "SELECT s.name, s.city AS city_or_code, s.state AS region, ",
    "ST_Y(s.geom) AS lat, ST_X(s.geom) AS lng ",
    "FROM ",
    stadiums!(),
    " s ",
    "WHERE s.name ILIKE $1 OR s.city ILIKE $1 OR s.state ILIKE $1"
);

/// `$1` escaped `ILIKE` pattern. Coordinates are the region centroid.
pub const SEARCH_REGIONS: &str = concat!(
    "SELECT t.name, t.stusps AS city_or_code, NULL::text AS region, ",
    "ST_Y(ST_Centroid(t.geom)) AS lat, ST_X(ST_Centroid(t.geom)) AS lng ",
    "FROM ",
    states!(),
    " t ",
    "WHERE t.name ILIKE $1 OR t.stusps ILIKE $1"
);

/// Runs first inside the insert transaction.
pub const SERIALIZABLE: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE";

/// No parameters. Returns the next identifier as `BIGINT`.
pub const NEXT_POINT_ID: &str = concat!(
    "SELECT COALESCE(MAX(id), 0) + 1 FROM ",
    stadiums!()
);

/// `$1` id, `$2` name, `$3` city, `$4` state, `$5` status, `$6` longitude,
/// `$7` latitude.
pub const INSERT_POINT: &str = concat!(
    "INSERT INTO ",
    stadiums!(),
    " (id, name, city, state, status, geom) ",
    "VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($6, $7), ",
    srid!(),
    "))"
);

/// `$1` name, `$2` city, `$3` state, `$4` id.
pub const UPDATE_POINT: &str = concat!(
    "UPDATE ",
    stadiums!(),
    " SET name = $1, city = $2, state = $3 ",
    "WHERE id = $4"
);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[&str] = &[
        COUNT_IN_REGION,
        COUNT_PER_REGION,
        NEAREST_POINT,
        SEARCH_POINTS,
        SEARCH_REGIONS,
        NEXT_POINT_ID,
        INSERT_POINT,
        UPDATE_POINT,
    ];

    #[test]
    fn statements_are_fully_qualified() {
        for stmt in ALL {
            assert!(
                stmt.contains("public.us_stadiums") || stmt.contains("public.us_states"),
                "unqualified statement: {}",
                stmt
            );
        }
    }

    #[test]
    fn no_format_placeholders_survive() {
        for stmt in ALL {
            assert!(!stmt.contains('{'), "placeholder left in: {}", stmt);
        }
    }

    #[test]
    fn insert_and_nearest_share_srid() {
        assert!(INSERT_POINT.contains("ST_MakePoint($6, $7), 4326)"));
        assert!(NEAREST_POINT.contains("ST_MakePoint($1, $2), 4326)"));
    }

    #[test]
    fn count_per_region_is_left_join() {
        assert!(COUNT_PER_REGION.contains("LEFT JOIN"));
        assert!(COUNT_PER_REGION.contains("GROUP BY t.name"));
    }

    #[test]
    fn search_uses_bound_pattern() {
        assert_eq!(SEARCH_POINTS.matches("ILIKE $1").count(), 3);
        assert_eq!(SEARCH_REGIONS.matches("ILIKE $1").count(), 2);
    }

    #[test]
    fn update_touches_only_attributes() {
        assert!(!UPDATE_POINT.contains("geom"));
        assert!(!UPDATE_POINT.contains("status"));
    }
}
