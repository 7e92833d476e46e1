use occurrence_fields::{OccurrenceSqlFields, parameter};
use predicate_model::{
    CompilerSettings, Predicate, PredicateCompiler, RangeValue, SearchParameter, SqlDialectKind,
};
use sql_compiler::SqlCompiler;
use tracing_test::traced_test;

fn key(name: &str) -> SearchParameter {
    parameter(name).unwrap()
}

fn compile(p: &Predicate) -> String {
    SqlCompiler::new(&OccurrenceSqlFields::new())
        .compile(Some(p))
        .unwrap()
}

#[test]
fn test_taxon_key_tests_every_rank_column() {
    let p = Predicate::equals(&key("TAXON_KEY"), "6", false).unwrap();
    assert_eq!(
        compile(&p),
        "(taxonkey = 6 OR acceptedtaxonkey = 6 OR kingdomkey = 6 OR phylumkey = 6 OR classkey = 6 \
         OR orderkey = 6 OR familykey = 6 OR genuskey = 6 OR specieskey = 6)"
    );
}

#[test]
fn test_scoped_taxon_key() {
    let p = Predicate::equals_in_scope(&key("TAXON_KEY"), "6", false, Some("7ddf754f")).unwrap();
    assert_eq!(
        compile(&p),
        "(stringArrayContains(classifications['7ddf754f'], '6', true))"
    );
    let p = Predicate::is_not_null_in_scope(&key("TAXON_KEY"), Some("7ddf754f")).unwrap();
    assert_eq!(
        compile(&p),
        "(classifications['7ddf754f'] IS NOT NULL AND size(classifications['7ddf754f']) > 0)"
    );
}

#[test]
fn test_gadm_gid_tests_every_level() {
    let p = Predicate::equals(&key("GADM_GID"), "irl_1", false).unwrap();
    assert_eq!(
        compile(&p),
        "(level0gid = 'IRL_1' OR level1gid = 'IRL_1' OR level2gid = 'IRL_1' OR level3gid = 'IRL_1')"
    );
}

#[test]
fn test_enum_arrays() {
    let p = Predicate::equals(&key("MEDIA_TYPE"), "StillImage", false).unwrap();
    assert_eq!(compile(&p), "stringArrayContains(mediatype,'STILLIMAGE',true)");

    let issue = key("ISSUE");
    let p = Predicate::not(
        Predicate::or(vec![
            Predicate::equals(&issue, "ZERO_COORDINATE", false).unwrap(),
            Predicate::equals(&issue, "COUNTRY_MISMATCH", false).unwrap(),
        ])
        .unwrap(),
    );
    assert_eq!(
        compile(&p),
        "NOT (stringArrayContains(issue,'ZERO_COORDINATE',true) OR stringArrayContains(issue,'COUNTRY_MISMATCH',true))"
    );
}

#[traced_test]
#[test]
fn test_enum_disjunction_folds_into_in() {
    let country = key("COUNTRY");
    let p = Predicate::or(vec![
        Predicate::equals(&country, "dk", false).unwrap(),
        Predicate::equals(&country, "no", false).unwrap(),
    ])
    .unwrap();
    assert_eq!(compile(&p), "(countrycode IN('DK', 'NO'))");
    assert!(logs_contain("Folding equalities into IN"));
}

#[test]
fn test_dates_by_storage_unit() {
    let p = Predicate::equals(&key("EVENT_DATE"), "2000-01-02", false).unwrap();
    assert_eq!(
        compile(&p),
        "(eventdategte >= 946771200 AND eventdatelte < 946857600)"
    );
    let p = Predicate::equals(&key("MODIFIED"), "2000-01-02", false).unwrap();
    assert_eq!(compile(&p), "(modified >= 946771200 AND modified < 946857600)");
    let p = Predicate::equals(&key("LAST_INTERPRETED"), "2000", false).unwrap();
    assert_eq!(
        compile(&p),
        "(lastinterpreted >= 946684800000 AND lastinterpreted < 978307200000)"
    );
    let p = Predicate::is_null(&key("EVENT_DATE")).unwrap();
    assert_eq!(compile(&p), "(eventdategte IS NULL AND eventdatelte IS NULL)");
}

#[test]
fn test_range_over_year() {
    let p = Predicate::range(&key("YEAR"), RangeValue::new().gte("1990").lt("2000")).unwrap();
    assert_eq!(compile(&p), "((year >= 1990) AND (year < 2000))");
}

#[test]
fn test_distance_from_centroid_includes_null() {
    let distance = key("DISTANCE_FROM_CENTROID_IN_METERS");
    let p = Predicate::greater_than_or_equals(&distance, "500").unwrap();
    assert_eq!(
        compile(&p),
        "(distancefromcentroidinmeters >= 500 OR distancefromcentroidinmeters IS NULL)"
    );
    let p = Predicate::less_than(&distance, "500").unwrap();
    assert_eq!(compile(&p), "distancefromcentroidinmeters < 500");
}

#[test]
fn test_vocabulary_lineage() {
    let p = Predicate::equals(&key("LIFE_STAGE"), "Adult", false).unwrap();
    assert_eq!(compile(&p), "stringArrayContains(lifestage.lineage,'Adult',false)");
}

#[test]
fn test_denormalized_event_id() {
    let p = Predicate::equals(&key("EVENT_ID"), "e1", false).unwrap();
    assert_eq!(
        compile(&p),
        "((lower(eventid) = lower('e1')) OR (array_contains(parents.eventid,'e1')))"
    );
    let p = Predicate::is_in(&key("EVENT_ID"), &["e1", "e2"], true).unwrap();
    assert_eq!(
        compile(&p),
        "(eventid IN('e1', 'e2') OR ((array_contains(parents.eventid,'e1')) OR (array_contains(parents.eventid,'e2'))))"
    );
}

#[test]
fn test_humboldt_columns() {
    let p = Predicate::equals(&key("HUMBOLDT_SITE_COUNT"), "1", false).unwrap();
    assert_eq!(compile(&p), "h.sitecount = 1");
    let p = Predicate::equals(&key("HUMBOLDT_VERBATIM_SITE_NAMES"), "1", false).unwrap();
    assert_eq!(compile(&p), "lower(h.verbatimsitenames) = lower('1')");
    let p = Predicate::equals(&key("HUMBOLDT_IS_ABSENCE_REPORTED"), "TRUE", false).unwrap();
    assert_eq!(compile(&p), "h.isabsencereported = true");
}

#[test]
fn test_humboldt_target_taxon_uses_default_checklist() {
    let p = Predicate::equals(&key("HUMBOLDT_TARGET_TAXONOMIC_SCOPE_TAXON_KEY"), "5", false).unwrap();
    assert_eq!(
        compile(&p),
        "(stringArrayContains(humboldttargettaxonclassifications\
         ['d7dddbf4-2cf0-4f39-9b2a-bb099caae36c']['taxonkeys'], '5', true))"
    );
}

#[test]
fn test_within_adds_bounding_box() {
    let p = Predicate::within("POLYGON((-20 63, -18 62, -14 63, -13 66, -18 67, -22 65, -20 63))");
    assert_eq!(
        compile(&p),
        "((decimallatitude >= 62.0 AND decimallatitude <= 67.0 AND \
         (decimallongitude >= -22.0 AND decimallongitude <= -13.0)) AND \
         contains('POLYGON ((-20 63, -18 62, -14 63, -13 66, -18 67, -22 65, -20 63))', \
         decimallatitude, decimallongitude) = TRUE)"
    );
}

#[test]
fn test_within_drops_repeated_vertices() {
    let p = Predicate::within("POLYGON((0 0, 10 0, 10 0, 10 10, 5 12, 0 10, 0 0))");
    assert_eq!(
        compile(&p),
        "((decimallatitude >= 0.0 AND decimallatitude <= 12.0 AND \
         (decimallongitude >= 0.0 AND decimallongitude <= 10.0)) AND \
         contains('POLYGON ((0 0, 10 0, 10 10, 5 12, 0 10, 0 0))', \
         decimallatitude, decimallongitude) = TRUE)"
    );
}

#[test]
fn test_within_rectangle_skips_bounding_box() {
    let p = Predicate::within("POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))");
    assert_eq!(
        compile(&p),
        "(contains('POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))', decimallatitude, decimallongitude) = TRUE)"
    );
}

#[test]
fn test_within_across_antimeridian_contains_split_shape() {
    let p = Predicate::within(
        "POLYGON((-180.14832 -16.72643, -180.21423 -16.82899, -180.12085 -17.12058, \
         -179.89838 -17.12845, -179.75006 -16.86054, -179.8764 -16.60277, -180.14832 -16.72643))",
    );
    let sql = compile(&p);
    assert!(sql.starts_with(
        "((decimallatitude >= -17.12845 AND decimallatitude <= -16.60277 AND \
         (decimallongitude >= 179.78577 OR decimallongitude <= -179.75006)) AND \
         contains('MULTIPOLYGON ((("
    ));
    assert!(!sql.contains("-180.1"));
    assert!(!sql.contains("-180.2"));
}

#[test]
fn test_spark_settings() {
    let settings = CompilerSettings {
        sql_dialect: SqlDialectKind::Spark,
        ..Default::default()
    };
    let fields = OccurrenceSqlFields::new();
    let p = Predicate::equals(&key("RECORDED_BY"), "Smith", true).unwrap();
    let sql = SqlCompiler::with_settings(&fields, &settings)
        .compile(Some(&p))
        .unwrap();
    assert_eq!(sql, "array_contains(recordedby,'Smith',true)");
}

#[test]
fn test_geological_time_interval() {
    let age = key("GEOLOGICAL_TIME");
    let p = Predicate::equals(&age, "12", false).unwrap();
    assert_eq!(
        compile(&p),
        "(12 > geologicaltime.gt AND 12 <= geologicaltime.lte)"
    );
    let p = Predicate::equals(&age, "10,20", false).unwrap();
    assert_eq!(
        compile(&p),
        "(geologicaltime.gt >= 10.0 AND geologicaltime.lte <= 20.0)"
    );
    let p = Predicate::less_than(&age, "5").unwrap();
    assert_eq!(compile(&p), "geologicaltime.gt < 5.0");
}

#[test]
fn test_reserved_column_is_suffixed() {
    let p = Predicate::equals(&key("GROUP"), "Plantae", true).unwrap();
    assert_eq!(compile(&p), "group_ = 'Plantae'");
}
