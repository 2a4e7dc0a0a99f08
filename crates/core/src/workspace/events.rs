use super::Workspace;
use crate::error::Result;

pub const DEFAULT_REGISTRATION_EVENT_CLASS: &str = "craft\\events\\RegisterComponentTypesEvent";

/// A class-level event handler: `Event::on(Class::class, Class::EVENT, function(EventClass $event) { ... })`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHandler {
    /// Class that triggers the event.
    pub class: String,
    /// Name of the event constant on `class`.
    pub event: String,
    /// Class of the event object passed to the handler.
    pub event_class: String,
    pub handler_code: String,
    /// Wrap the subscription in `if (class_exists(...))`.
    pub ensure_class_exists: bool,
}

/// Registers a component class through a registration event, by default
/// `$event->types[] = Component::class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationHandler {
    pub class: String,
    pub event: String,
    pub component_class: String,
    pub ensure_class_exists: bool,
    pub event_class: String,
    pub event_property: String,
}

impl RegistrationHandler {
    pub fn new(
        class: impl Into<String>,
        event: impl Into<String>,
        component_class: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            event: event.into(),
            component_class: component_class.into(),
            ensure_class_exists: false,
            event_class: DEFAULT_REGISTRATION_EVENT_CLASS.to_string(),
            event_property: "types".to_string(),
        }
    }

    pub fn ensure_class_exists(mut self, ensure: bool) -> Self {
        self.ensure_class_exists = ensure;
        self
    }

    pub fn event_class(mut self, event_class: impl Into<String>) -> Self {
        self.event_class = event_class.into();
        self
    }

    pub fn event_property(mut self, property: impl Into<String>) -> Self {
        self.event_property = property.into();
        self
    }
}

impl Workspace {
    /// Imports every class the handler refers to and returns the
    /// subscription code.
    pub fn prepare_event_handler_code(&mut self, handler: &EventHandler) -> Result<String> {
        let base_event_class = self.base_event_class.clone();
        let base = self.import_class(&base_event_class)?;
        let class = self.import_class(&handler.class)?;
        let event_class = self.import_class(&handler.event_class)?;
        let event = &handler.event;
        let handler_code = &handler.handler_code;

        let mut code = format!(
            "{base}::on({class}::class, {class}::{event}, function({event_class} $event) {{\n    {handler_code}\n}});"
        );
        if handler.ensure_class_exists {
            code = format!("if (class_exists({class}::class)) {{\n    {code}\n}}");
        }
        Ok(code)
    }

    pub fn prepare_registration_event_handler_code(
        &mut self,
        registration: &RegistrationHandler,
    ) -> Result<String> {
        let component = self.import_class(&registration.component_class)?;
        let handler = EventHandler {
            class: registration.class.clone(),
            event: registration.event.clone(),
            event_class: registration.event_class.clone(),
            handler_code: format!(
                "$event->{}[] = {component}::class;",
                registration.event_property
            ),
            ensure_class_exists: registration.ensure_class_exists,
        };
        self.prepare_event_handler_code(&handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::format_snippet;

    const MODULE: &str = "<?php\nnamespace modules\\foo;\n\nuse Craft;\n\nclass Module extends \\yii\\base\\Module\n{\n}\n";

    #[test]
    fn test_prepare_registration_code() {
        let mut workspace = Workspace::new(MODULE);
        let code = workspace
            .prepare_registration_event_handler_code(&RegistrationHandler::new(
                "craft\\services\\Fields",
                "EVENT_REGISTER_FIELD_TYPES",
                "modules\\foo\\fields\\MyField",
            ))
            .unwrap();
        let formatted = format_snippet(&code, workspace.options()).unwrap();
        insta::assert_snapshot!(formatted, @r###"
        Event::on(Fields::class, Fields::EVENT_REGISTER_FIELD_TYPES, function(RegisterComponentTypesEvent $event) {
            $event->types[] = MyField::class;
        });
        "###);
        assert_eq!(
            workspace.print_new_imports(),
            "use craft\\events\\RegisterComponentTypesEvent;\nuse craft\\services\\Fields;\nuse modules\\foo\\fields\\MyField;\nuse yii\\base\\Event;\n\n"
        );
    }

    #[test]
    fn test_prepare_event_handler_with_guard() {
        let mut workspace = Workspace::new(MODULE);
        let code = workspace
            .prepare_event_handler_code(&EventHandler {
                class: "craft\\commerce\\elements\\Order".to_string(),
                event: "EVENT_AFTER_COMPLETE_ORDER".to_string(),
                event_class: "yii\\base\\Event".to_string(),
                handler_code: "// ...".to_string(),
                ensure_class_exists: true,
            })
            .unwrap();
        assert_eq!(
            code,
            "if (class_exists(Order::class)) {\n    Event::on(Order::class, Order::EVENT_AFTER_COMPLETE_ORDER, function(Event $event) {\n    // ...\n});\n}"
        );
    }
}
