mod domain;
mod draft;
mod form;
