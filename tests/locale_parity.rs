use std::collections::BTreeSet;
use std::fs;

use regex::Regex;
use serde_yaml::Value;

fn flatten(prefix: &str, value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let Some(key) = k.as_str() else { continue };
                if key.starts_with('_') {
                    continue;
                }
                let path = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, v, out);
            }
        }
        _ => {
            out.insert(prefix.to_string());
        }
    }
}

fn keys(locale: &str) -> BTreeSet<String> {
    let content = fs::read_to_string(format!("locales/{locale}.yml")).unwrap();
    let value: Value = serde_yaml::from_str(&content).unwrap();
    let mut out = BTreeSet::new();
    flatten("", &value, &mut out);
    out
}

fn placeholders(locale: &str, key: &str) -> BTreeSet<String> {
    let content = fs::read_to_string(format!("locales/{locale}.yml")).unwrap();
    let value: Value = serde_yaml::from_str(&content).unwrap();
    let text = key
        .split('.')
        .try_fold(&value, |v, part| v.get(part))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let re = Regex::new(r"%\{(\w+)\}").unwrap();
    re.captures_iter(&text).map(|c| c[1].to_string()).collect()
}

#[test]
fn arabic_and_english_define_the_same_keys() {
    let en = keys("en");
    let ar = keys("ar");
    let missing_ar: Vec<_> = en.difference(&ar).collect();
    let missing_en: Vec<_> = ar.difference(&en).collect();
    assert!(missing_ar.is_empty(), "missing in ar: {missing_ar:?}");
    assert!(missing_en.is_empty(), "missing in en: {missing_en:?}");
}

#[test]
fn placeholders_match_between_locales() {
    for key in keys("en") {
        assert_eq!(placeholders("en", &key), placeholders("ar", &key), "key {key}");
    }
}

#[test]
fn every_key_used_in_source_exists() {
    let en = keys("en");
    let re = Regex::new(r#"(?:t!\(\s*|required\([^,]+,\s*)"([a-z_]+\.[a-z_.]+)""#).unwrap();
    let mut stack = vec![std::path::PathBuf::from("src")];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "rs") {
                let source = fs::read_to_string(&path).unwrap();
                for cap in re.captures_iter(&source) {
                    assert!(en.contains(&cap[1]), "{} uses unknown key {}", path.display(), &cap[1]);
                }
            }
        }
    }
}
