mod wizard;

pub use wizard::{save_export, Wizard, WizardNotify};
