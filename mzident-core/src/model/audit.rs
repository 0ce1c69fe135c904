use crate::arena::ContextId;
use crate::document::Document;
use crate::entity::{arena_access, impl_entity, impl_registered, Entity, Kind};
use crate::param::{Annotation, CvParam};
use crate::reference::Ref;
use crate::ValueEq;

#[derive(Debug, Clone, Default, ValueEq)]
pub struct Person {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mid_initials: Option<String>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

#[derive(Debug, Clone, Default, ValueEq)]
pub struct Organization {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

/// A person or an organization; both live in the contacts registry.
#[derive(Debug, Clone, ValueEq)]
pub enum Contact {
    Person(Person),
    Organization(Organization),
}

impl Contact {
    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Contact::Person(person) => Some(person),
            Contact::Organization(_) => None,
        }
    }

    pub fn as_organization(&self) -> Option<&Organization> {
        match self {
            Contact::Organization(org) => Some(org),
            Contact::Person(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Contact::Person(person) => person.name.as_deref(),
            Contact::Organization(org) => org.name.as_deref(),
        }
    }
}

impl From<Person> for Contact {
    fn from(person: Person) -> Self {
        Contact::Person(person)
    }
}

impl From<Organization> for Contact {
    fn from(org: Organization) -> Self {
        Contact::Organization(org)
    }
}

impl Entity for Contact {
    const KIND: &'static str = "Contact";

    fn id(&self) -> Option<&str> {
        match self {
            Contact::Person(person) => person.id.as_deref(),
            Contact::Organization(org) => org.id.as_deref(),
        }
    }

    fn set_id(&mut self, id: Option<String>) {
        match self {
            Contact::Person(person) => person.id = id,
            Contact::Organization(org) => org.id = id,
        }
    }

    fn context(&self) -> Option<ContextId> {
        match self {
            Contact::Person(person) => person.context,
            Contact::Organization(org) => org.context,
        }
    }

    fn attach(&mut self, context: Option<ContextId>) {
        match self {
            Contact::Person(person) => person.context = context,
            Contact::Organization(org) => org.context = context,
        }
    }
}

impl Kind for Contact {
    arena_access!(contacts);
}

impl_registered!(Contact, contacts);

/// A contact together with the role it plays.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct ContactRole {
    pub contact: Ref<Contact>,
    pub role: CvParam,
}

impl ContactRole {
    fn resolve_refs(&mut self, doc: &Document) -> usize {
        usize::from(self.contact.resolve(doc))
    }
}

/// Software that produced or processed the identifications.
#[derive(Debug, Clone, Default, ValueEq)]
pub struct AnalysisSoftware {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub uri: Option<String>,
    pub software_name: Option<Annotation>,
    pub developer: Option<ContactRole>,
    pub customizations: Option<String>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(AnalysisSoftware, "AnalysisSoftware");

impl Kind for AnalysisSoftware {
    arena_access!(software);

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        self.developer.as_mut().map_or(0, |role| role.resolve_refs(doc))
    }
}

impl_registered!(AnalysisSoftware, software);

#[derive(Debug, Clone, Default, ValueEq)]
pub struct Sample {
    #[value_eq(skip)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub contact_roles: Vec<ContactRole>,
    pub annotations: Vec<Annotation>,
    #[value_eq(skip)]
    pub context: Option<ContextId>,
}

impl_entity!(Sample, "Sample");

impl Kind for Sample {
    arena_access!(samples);

    fn resolve_refs(&mut self, doc: &Document) -> usize {
        self.contact_roles.iter_mut().map(|role| role.resolve_refs(doc)).sum()
    }
}

impl_registered!(Sample, samples);
