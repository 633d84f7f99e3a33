#![cfg(feature = "insta")]

use gotempl_syntax::parse;

fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    let mut out = serde_json::to_string_pretty(value).expect("serialize json");
    out.push('\n');
    out
}

#[test]
fn representative_template_parse() {
    let src = concat!(
        "{{/*gotype: example.com/app/models.User*/}}\n",
        "Hello {{ .Name }}!\n",
        "{{range .Friends}}{{ .Name | upper }}{{end}}\n",
        "{{define \"footer\"}}{{ printf \"%s (%d)\" .Name .Age }}{{end}}\n",
    );
    let parsed = parse(src, "representative.tmpl").expect("parse");
    insta::assert_snapshot!("representative_parse", pretty_json(&parsed));
}
