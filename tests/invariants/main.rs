//! Properties that must hold for every input in a family, checked over
//! enumerated inputs rather than hand-picked fixtures.
//!
//! Run with: cargo test --test invariants

use boot_transpiler::compile;
use libtest_mimic::{Arguments, Failed, Trial};

const SCREEN_SIZES: &[&str] = &["xs", "sm", "md", "lg"];

fn main() {
    let _ = env_logger::builder().is_test(true).try_init();

    let args = Arguments::from_args();
    let trials = vec![
        Trial::test("row_completeness", row_completeness),
        Trial::test("column_default_size", column_default_size),
        Trial::test("numbered_column_size", numbered_column_size),
        Trial::test("compound_attribute_fan_out", compound_attribute_fan_out),
        Trial::test("shorthand_line_expansion", shorthand_line_expansion),
        Trial::test("ie_comment_preservation", ie_comment_preservation),
        Trial::test("balanced_divs", balanced_divs),
    ];
    libtest_mimic::run(&args, trials).exit();
}

fn compiled(source: &str) -> Result<String, Failed> {
    compile(source).map_err(|e| Failed::from(format!("{}: {}", source, e)))
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), Failed> {
    if condition { Ok(()) } else { Err(message().into()) }
}

/// Class list of the first `<div>` after `skip` leading divs
fn nth_div_classes(html: &str, skip: usize) -> Option<Vec<String>> {
    let tag = html.split("<div").nth(skip + 1)?;
    let tag = &tag[..tag.find('>')?];
    let start = tag.find("class=\"")? + "class=\"".len();
    let end = start + tag[start..].find('"')?;
    Some(tag[start..end].split_whitespace().map(str::to_string).collect())
}

fn row_completeness() -> Result<(), Failed> {
    let bodies = [
        "",
        "text",
        "\n  text\n",
        "<p>a</p><p>b</p>",
        "\n  <!-- note -->\n  <span>x</span>\n",
        "<section><c4>nested column is not a row column</c4></section>",
    ];
    for body in bodies {
        let source = format!("<r>{}</r>", body);
        let html = compiled(&source)?;
        let opening = "<div class=\"row\"><div class=\"col-md-12\">";
        check(html.starts_with(opening), || format!("{} -> {}", source, html))?;
        check(html.ends_with("</div></div>"), || format!("{} -> {}", source, html))?;
        check(html.matches("col-md-12").count() == 1, || {
            format!("{} -> {}", source, html)
        })?;
    }
    Ok(())
}

fn column_default_size() -> Result<(), Failed> {
    let attribute_sets = [
        "",
        "class=\"x\"",
        "id=\"a\" hidden",
        "push2",
        "offset:xs1-md3",
        "size:xx9",
        "visible-inline:lg",
    ];
    for attributes in attribute_sets {
        let source = format!("<c {}>x</c>", attributes);
        let html = compiled(&source)?;
        let classes = nth_div_classes(&html, 0).unwrap_or_default();
        check(classes.first().map(String::as_str) == Some("col-md-1"), || {
            format!("{} -> {}", source, html)
        })?;
    }

    // An explicit size suppresses the default
    for size in SCREEN_SIZES {
        for n in 1..=12 {
            let source = format!("<c {}{}>x</c>", size, n);
            let html = compiled(&source)?;
            check(
                nth_div_classes(&html, 0) == Some(vec![format!("col-{}-{}", size, n)]),
                || format!("{} -> {}", source, html),
            )?;
        }
    }
    Ok(())
}

fn numbered_column_size() -> Result<(), Failed> {
    let attribute_sets = ["", "lg3", "size:xs12-sm6", "class=\"y\" hidden:md", "push:md2"];
    for n in 1..=12 {
        for attributes in attribute_sets {
            let source = format!("<c{n} {attributes}></c{n}>");
            let html = compiled(&source)?;
            let classes = nth_div_classes(&html, 0).unwrap_or_default();
            let expected = format!("col-md-{}", n);
            check(classes.first() == Some(&expected), || {
                format!("{} -> {}", source, html)
            })?;
            check(html.ends_with("></div>"), || format!("{} -> {}", source, html))?;
        }
    }
    Ok(())
}

fn compound_attribute_fan_out() -> Result<(), Failed> {
    let cases: &[(&str, &[&str])] = &[
        ("size:md8-lg4", &["col-md-8", "col-lg-4"]),
        ("size:md8-xx9-lg4", &["col-md-8", "col-lg-4"]),
        ("size:lg4-md8", &["col-lg-4", "col-md-8"]),
        ("offset:sm0-md12", &["col-sm-offset-0", "col-md-offset-12"]),
        ("pull:xs3", &["col-xs-pull-3"]),
        ("hidden:xs-sm-md-lg", &["hidden-xs", "hidden-sm", "hidden-md", "hidden-lg"]),
    ];
    for (attribute, expected) in cases {
        let source = format!("<c6 {}></c6>", attribute);
        let html = compiled(&source)?;
        let classes = nth_div_classes(&html, 0).unwrap_or_default();
        check(
            classes.len() == expected.len() + 1 && classes[1..] == **expected,
            || format!("{} -> {}", source, html),
        )?;
        check(!html.contains(attribute), || format!("{} -> {}", source, html))?;
    }
    Ok(())
}

fn shorthand_line_expansion() -> Result<(), Failed> {
    for indent in ["", "  ", "\t", "        "] {
        for gap in ["", "\n", "\n\n"] {
            let source = format!(
                "<head>\n{indent}<js>\n{indent}  a.js\n{gap}{indent}  b.js\n{indent}</js>\n</head>"
            );
            let html = compiled(&source)?;
            let expected = format!(
                "<head>\n{indent}<script src=\"a.js\"></script>\n{gap}{indent}<script src=\"b.js\"></script>\n</head>"
            );
            check(html == expected, || {
                format!("{:?}\n  expected {:?}\n  actual   {:?}", source, expected, html)
            })?;
        }
    }
    Ok(())
}

fn ie_comment_preservation() -> Result<(), Failed> {
    for condition in ["lt IE 9", "IE 8", "lte IE 7"] {
        let source = format!("<css><!--[if {}]> a.css <![endif]--></css>", condition);
        let html = compiled(&source)?;
        let expected = format!(
            "<!--[if {}]> <link href=\"a.css\" rel=\"stylesheet\"> <![endif]-->",
            condition
        );
        check(html == expected, || format!("{} -> {}", source, html))?;
    }

    // Ordinary comments are left alone
    let html = compiled("<css><!-- [if] not conditional --></css>")?;
    check(html == "<!-- [if] not conditional -->", || html.clone())
}

fn balanced_divs() -> Result<(), Failed> {
    let sources = [
        "<container><r><c>a</c><c6>b</c6></r></container>",
        "<r>implied</r><clearfix/>",
        "<r><r><c>x</c></r></r>",
        "<container-fluid><r>\n  <p>x</p>\n</r></container-fluid>",
        "<r><c12><r>deep</r></c12></r>",
        "<container/><r/>x<clearfix/>",
        "<r>\n  <c6/>\n  text\n</r>",
        "<r><c4 hidden /><r/></r>",
    ];
    for source in sources {
        let html = compiled(source)?;
        check(html.matches("<div").count() == html.matches("</div>").count(), || {
            format!("{} -> {}", source, html)
        })?;
    }
    Ok(())
}
