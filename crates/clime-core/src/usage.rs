//! One-line usage synopsis rendered from a [`ParameterModel`].

use crate::model::ParameterModel;

fn spelling(model: &ParameterModel, key: &str) -> String {
    let meta = model.spelling_metavar(key);
    if key.chars().count() > 1 {
        let long = key.replace('_', "-");
        match meta {
            Some(meta) => format!("--{long}={meta}"),
            None => format!("--{long}"),
        }
    } else {
        format!("-{key}{}", meta.unwrap_or_default())
    }
}

/// Render `[-t<int> | --times=<int>] ... <message> [--<key>=<value>...] [<args>...]`,
/// prefixed by `name` when given.
pub fn render(model: &ParameterModel, name: Option<&str>) -> String {
    let mut usage: Vec<String> = Vec::new();

    for optional in model.optional_names() {
        let pieces: Vec<String> = model
            .aliases(optional)
            .chain(std::iter::once(optional))
            .map(|key| spelling(model, key))
            .collect();
        usage.push(format!("[{}]", pieces.join(" | ")));
    }

    usage.extend(model.required_names().map(|n| format!("<{n}>")));

    if model.kwarg().is_some() {
        usage.push("[--<key>=<value>...]".to_string());
    }
    if let Some(vararg) = model.vararg() {
        usage.push(format!("[<{vararg}>...]"));
    }

    match name {
        Some(name) if usage.is_empty() => name.to_string(),
        Some(name) => format!("{name} {}", usage.join(" ")),
        None => usage.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    #[test]
    fn repeat_usage() {
        let sig = Signature::new("repeat")
            .param("message")
            .param_default("times", 2)
            .param_default("count", false);
        let doc = "-m=<str>, --message=<str>\n-t=<int>, --times=<int>\n-c, --count";
        let model = ParameterModel::new(&sig, Some(doc));
        assert_eq!(
            render(&model, Some("repeat")),
            "repeat [-t<int> | --times=<int>] [-c | --count] <message>"
        );
        assert_eq!(
            render(&model, None),
            "[-t<int> | --times=<int>] [-c | --count] <message>"
        );
    }

    #[test]
    fn catch_alls_come_last() {
        let sig = Signature::new("echo")
            .param("first")
            .param_default("dry_run", false)
            .vararg("args")
            .kwarg("opts");
        let model = ParameterModel::new(&sig, None);
        assert_eq!(
            render(&model, Some("echo")),
            "echo [--dry-run] <first> [--<key>=<value>...] [<args>...]"
        );
    }

    #[test]
    fn empty_signature_renders_bare_name() {
        let model = ParameterModel::new(&Signature::new("noop"), None);
        assert_eq!(render(&model, Some("noop")), "noop");
        assert_eq!(render(&model, None), "");
    }
}
