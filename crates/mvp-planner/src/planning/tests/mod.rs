mod common;
mod scenarios;
mod selection;
