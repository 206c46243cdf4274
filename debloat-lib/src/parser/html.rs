//! Builds a [`UsedMarkup`] profile from an HTML document.
//!
//! html5ever drives a `TreeSink` that never builds a tree: every element it
//! creates is recorded (tag, classes, id) and then forgotten.

use crate::markup::UsedMarkup;
use html5ever::interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use std::borrow::Cow;
use std::cell::RefCell;

/// Parse `html_content` and collect every tag, class and id it contains.
pub fn collect_used_markup(html_content: &str) -> UsedMarkup {
    html5ever::parse_document(UsedMarkupSink::new(), Default::default()).one(html_content)
}

/// A `TreeSink` that records used markup instead of building a DOM.
///
/// Handles are indices into `names`; index 0 is the document.
pub struct UsedMarkupSink {
    names: RefCell<Vec<Option<QualName>>>,
    used: RefCell<UsedMarkup>,
}

impl Default for UsedMarkupSink {
    fn default() -> Self {
        Self::new()
    }
}

impl UsedMarkupSink {
    pub fn new() -> Self {
        Self {
            names: RefCell::new(vec![None]),
            used: RefCell::new(UsedMarkup::new()),
        }
    }

    fn new_handle(&self, name: Option<QualName>) -> usize {
        let mut names = self.names.borrow_mut();
        names.push(name);
        names.len() - 1
    }

    fn record_attrs(&self, attrs: &[Attribute]) {
        let mut used = self.used.borrow_mut();
        for attr in attrs {
            match attr.name.local.as_ref() {
                "class" => {
                    for class in attr.value.split_whitespace() {
                        used.insert_class(class);
                    }
                }
                "id" => {
                    let id = attr.value.trim();
                    if !id.is_empty() {
                        used.insert_id(id);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Owned element name handed back to html5ever.
#[derive(Debug)]
pub struct ElementName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for ElementName {
    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.local
    }
}

impl TreeSink for UsedMarkupSink {
    type Handle = usize;
    type Output = UsedMarkup;
    type ElemName<'a>
        = ElementName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.used.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        0
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match self.names.borrow().get(*target) {
            Some(Some(name)) => ElementName {
                ns: name.ns.clone(),
                local: name.local.clone(),
            },
            _ => ElementName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        self.used.borrow_mut().insert_tag(name.local.as_ref());
        self.record_attrs(&attrs);
        self.new_handle(Some(name))
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.new_handle(None)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.new_handle(None)
    }

    fn append(&self, _parent: &Self::Handle, _child: NodeOrText<Self::Handle>) {}

    fn append_based_on_parent_node(
        &self,
        _element: &Self::Handle,
        _prev_element: &Self::Handle,
        _child: NodeOrText<Self::Handle>,
    ) {
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, _sibling: &Self::Handle, _child: NodeOrText<Self::Handle>) {}

    /// html5ever merges attributes of repeated `<html>`/`<body>` tags here.
    fn add_attrs_if_missing(&self, _target: &Self::Handle, attrs: Vec<Attribute>) {
        self.record_attrs(&attrs);
    }

    fn remove_from_parent(&self, _target: &Self::Handle) {}

    fn reparent_children(&self, _node: &Self::Handle, _new_parent: &Self::Handle) {}
}
