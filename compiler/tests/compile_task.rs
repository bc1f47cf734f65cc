//! End-to-end compilation tests: task in, rendered script out.

use morphscript::{
    compile_task, extract, CompileError, CompileOptions, Component, Filter, Mapping, RenderConfig,
    RenderError, ScriptBuilder, Task,
};

const DECLARATION: &str = "<?xml version=\"1.1\" encoding=\"UTF-8\" standalone=\"no\"?>";

fn person_task(filter: &str) -> Task {
    Task::new("persons").with_mapping(
        Mapping::new("names", "person.name", "contact.name", Component::new("trim_name", "trim"))
            .with_filter(Filter::new("f", filter)),
    )
}

#[test]
fn test_filtered_mapping_script() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder.apply(&person_task(r#"[{"person.age":"^[0-9]+$"}]"#)).unwrap();

    let script = builder.render(false, "UTF-8").unwrap();
    let expected = [
        DECLARATION,
        "<metamorph xmlns=\"http://www.culturegraph.org/metamorph\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"http://www.culturegraph.org/metamorph metamorph.xsd\" \
         entityMarker=\".\" version=\"1\">",
        "<meta><name>persons</name></meta>",
        "<rules>",
        "<combine reset=\"true\" sameEntity=\"true\" includeSubEntities=\"true\" \
         name=\"@names__input\" value=\"${names__input.filtered}\" flushWith=\"person\">",
        "<if><all name=\"CONDITION_ALL\" reset=\"true\" includeSubEntities=\"true\" \
         flushWith=\"person.age\">",
        "<data source=\"person.age\"><regexp match=\"^[0-9]+$\"/></data>",
        "</all></if>",
        "<data source=\"person.name\" name=\"names__input.filtered\"/>",
        "</combine>",
        "<data source=\"@names__input\" name=\"contact.name\"><trim/></data>",
        "</rules>",
        "<maps/>",
        "</metamorph>",
    ]
    .concat();

    assert_eq!(script, expected);
}

#[test]
fn test_partial_identifier_filter_flushes_with_record() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder.apply(&person_task(r#"[{"pers.x":"y"}]"#)).unwrap();

    let script = builder.render(false, "UTF-8").unwrap();
    assert!(script.contains("flushWith=\"record\""));
    assert!(script.contains("flushWith=\"pers.x\""));
}

#[test]
fn test_filter_extending_value_identifier_flushes_with_it() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder.apply(&person_task(r#"[{"personal.x":"y"}]"#)).unwrap();

    let script = builder.render(false, "UTF-8").unwrap();
    assert!(script.contains(
        "name=\"@names__input\" value=\"${names__input.filtered}\" flushWith=\"person\""
    ));
    assert!(script.contains("flushWith=\"personal.x\""));
}

#[test]
fn test_conditions_keep_expression_order() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder
        .apply(&person_task(r#"[{"person.gender":"f"},{"person.age":"^4"}]"#))
        .unwrap();

    let script = builder.render(false, "UTF-8").unwrap();
    let gender = script.find("source=\"person.gender\"").unwrap();
    let age = script.find("source=\"person.age\"").unwrap();
    assert!(gender < age);
    assert!(script.contains(
        "all name=\"CONDITION_ALL\" reset=\"true\" includeSubEntities=\"true\" \
         flushWith=\"person.age\""
    ));
}

#[test]
fn test_escaped_expression_is_unescaped() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder
        .apply(&person_task("[{&quot;person.age&quot;:&quot;^[0-9]+$&quot;}]"))
        .unwrap();

    let script = builder.render(false, "UTF-8").unwrap();
    assert!(script.contains("<data source=\"person.age\"><regexp match=\"^[0-9]+$\"/></data>"));
    assert!(builder.diagnostics().is_empty());
}

#[test]
fn test_malformed_filter_compiles_unfiltered() {
    let config = RenderConfig::default();
    let compiled =
        compile_task(&person_task("not json"), &config, &CompileOptions::default()).unwrap();

    assert_eq!(compiled.filter_count, 0);
    assert_eq!(compiled.rule_count, 2);
    assert_eq!(compiled.diagnostics.len(), 1);
    assert!(!compiled.script.contains("<combine"));
}

#[test]
fn test_render_is_repeatable() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder.apply(&person_task(r#"[{"person.age":"1"}]"#)).unwrap();

    let first = builder.render(true, "UTF-8");
    assert!(first.is_some());
    assert_eq!(first, builder.render(true, "UTF-8"));
    assert!(builder.render(false, "no-such-encoding").is_none());
}

#[test]
fn test_indented_script_layout() {
    let config = RenderConfig::default();
    let mut builder = ScriptBuilder::metamorph(&config);
    builder.initialize(&Task::new("empty"));

    let script = builder.render(true, "UTF-8").unwrap();
    assert!(script.starts_with(&format!("{}\n<metamorph ", DECLARATION)));
    assert!(script.contains("\n    <meta>\n        <name>empty</name>\n    </meta>\n"));
    assert!(script.ends_with("</metamorph>\n"));
}

#[test]
fn test_invalid_component_names_yield_no_script() {
    let config = RenderConfig::default();
    let task = Task::new("t").with_mapping(Mapping::new(
        "m",
        "a.b",
        "c",
        Component::new("c", "bad name\"").with_parameter("x y", "1"),
    ));

    let mut builder = ScriptBuilder::metamorph(&config);
    builder.apply(&task).unwrap();
    assert!(builder.render(false, "UTF-8").is_none());
    assert!(matches!(
        builder.try_render(false, "UTF-8"),
        Err(RenderError::InvalidName { .. })
    ));

    assert!(matches!(
        compile_task(&task, &config, &CompileOptions::default()),
        Err(CompileError::Render(RenderError::InvalidName { .. }))
    ));
}

#[test]
fn test_extract_edge_cases() {
    assert!(extract(None).is_empty());
    assert!(extract(Some("")).is_empty());
    assert!(extract(Some("{\"a.b\":\"x\"}")).is_empty());
    assert!(extract(Some("[1, \"two\", null]")).is_empty());

    let expression = extract(Some(r#"[{"a.b":"x"},{"a.c":"y"},{"a.b":"z"}]"#));
    let entries: Vec<(&str, &str)> = expression.iter().collect();
    assert_eq!(entries, vec![("a.b", "z"), ("a.c", "y")]);
}
