use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::InteractionContext;
use crate::error::{BotError, ErrorKind, Result};
use crate::types::discord::ComponentType;

/// Separates the handler key from positional arguments in a custom id.
pub const CUSTOM_ID_DELIMITER: char = '|';

/// Split `id|arg1|arg2` into the handler key and its arguments.
pub fn parse_custom_id(custom_id: &str) -> Result<(String, Vec<String>)> {
    let mut segments = custom_id.split(CUSTOM_ID_DELIMITER).map(str::to_string);
    match segments.next() {
        Some(id) if !id.is_empty() => Ok((id, segments.collect())),
        _ => Err(BotError::kind(ErrorKind::MalformedComponentIdentifier)
            .push_str(format!("custom id {:?}", custom_id))),
    }
}

/// Build the custom id that routes back to component `id` with `args`.
pub fn custom_id<S: AsRef<str>>(id: &str, args: &[S]) -> String {
    let mut out = id.to_string();
    for arg in args {
        out.push(CUSTOM_ID_DELIMITER);
        out.push_str(arg.as_ref());
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub id: String,
    pub kind: ComponentType,
}

impl ComponentDefinition {
    pub fn button(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ComponentType::Button,
        }
    }

    pub fn select_menu(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ComponentType::SelectMenu,
        }
    }
}

/// Trait for button and select menu handlers
#[async_trait]
pub trait Component: Send + Sync {
    fn definition(&self) -> ComponentDefinition;

    async fn handle(&self, ctx: &mut InteractionContext) -> Result<()>;
}

/// Immutable id lookup per component category.
#[derive(Default)]
pub struct ComponentRegistry {
    by_type: HashMap<ComponentType, HashMap<String, Arc<dyn Component>>>,
}

impl ComponentRegistry {
    pub fn new(components: Vec<Arc<dyn Component>>) -> Result<Self> {
        let mut by_type: HashMap<ComponentType, HashMap<String, Arc<dyn Component>>> = HashMap::new();
        for component in components {
            let definition = component.definition();
            if definition.id.is_empty() || definition.id.contains(CUSTOM_ID_DELIMITER) {
                return Err(BotError::kind(ErrorKind::MalformedComponentIdentifier)
                    .push_str(format!("component id {:?}", definition.id)));
            }
            let named = by_type.entry(definition.kind).or_default();
            if named.contains_key(&definition.id) {
                return Err(BotError::kind(ErrorKind::DuplicateComponent)
                    .push_str(format!("{:?} `{}`", definition.kind, definition.id)));
            }
            named.insert(definition.id, component);
        }
        Ok(Self { by_type })
    }

    pub fn get(&self, kind: ComponentType, id: &str) -> Option<&Arc<dyn Component>> {
        self.by_type.get(&kind)?.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Stub(ComponentDefinition);

    #[async_trait]
    impl Component for Stub {
        fn definition(&self) -> ComponentDefinition {
            self.0.clone()
        }

        async fn handle(&self, ctx: &mut InteractionContext) -> Result<()> {
            ctx.defer()
        }
    }

    #[rstest]
    #[case("buy|123|gold", "buy", &["123", "gold"])]
    #[case("buy", "buy", &[])]
    #[case("buy||x", "buy", &["", "x"])]
    #[case("page|", "page", &[""])]
    fn parses_custom_ids(#[case] raw: &str, #[case] id: &str, #[case] args: &[&str]) {
        let (parsed_id, parsed_args) = parse_custom_id(raw).unwrap();
        assert_eq!(parsed_id, id);
        assert_eq!(parsed_args, args);
    }

    #[rstest]
    #[case("")]
    #[case("|123")]
    fn rejects_missing_key(#[case] raw: &str) {
        let err = parse_custom_id(raw).unwrap_err();
        assert!(err.is(ErrorKind::MalformedComponentIdentifier));
    }

    #[test]
    fn custom_id_inverts_parse() {
        let built = custom_id("buy", &["123", "gold"]);
        assert_eq!(built, "buy|123|gold");
        assert_eq!(parse_custom_id(&built).unwrap(), ("buy".to_string(), vec!["123".to_string(), "gold".to_string()]));
        assert_eq!(custom_id::<&str>("plain", &[]), "plain");
    }

    #[test]
    fn buttons_and_selects_have_separate_namespaces() {
        let registry = ComponentRegistry::new(vec![
            Arc::new(Stub(ComponentDefinition::button("shop"))),
            Arc::new(Stub(ComponentDefinition::select_menu("shop"))),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(ComponentType::Button, "shop").is_some());
        assert!(registry.get(ComponentType::SelectMenu, "missing").is_none());
    }

    #[test]
    fn duplicate_id_fails_startup() {
        let err = ComponentRegistry::new(vec![
            Arc::new(Stub(ComponentDefinition::button("shop"))),
            Arc::new(Stub(ComponentDefinition::button("shop"))),
        ])
        .err()
        .unwrap();
        assert!(err.is(ErrorKind::DuplicateComponent));
    }

    #[test]
    fn id_containing_delimiter_fails_startup() {
        let err = ComponentRegistry::new(vec![Arc::new(Stub(ComponentDefinition::button("a|b")))])
            .err()
            .unwrap();
        assert!(err.is(ErrorKind::MalformedComponentIdentifier));
    }
}
