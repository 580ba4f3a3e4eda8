use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use wiremount::prelude::*;

#[derive(Default)]
pub struct NoteStore {
    notes: Mutex<Vec<String>>,
}

#[async_trait]
impl Injectable for NoteStore {
    async fn inject(_injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self::default())
    }
}

impl NoteStore {
    fn with<T>(&self, f: impl FnOnce(&mut Vec<String>) -> T) -> T {
        let mut notes = self.notes.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut notes)
    }
}

#[derive(Deserialize)]
struct NewNote {
    text: String,
}

pub struct NotesController {
    base: Controller,
    store: Arc<NoteStore>,
}

#[async_trait]
impl Injectable for NotesController {
    async fn inject(injector: &Injector) -> wiremount::Result<Self> {
        Ok(Self {
            base: Controller::inject(injector).await?,
            store: injector.get_instance().await?,
        })
    }
}

impl NotesController {
    async fn get(self: Arc<Self>) -> wiremount::Result<()> {
        let notes = self.store.with(|notes| notes.clone());
        self.base.ctx().set_body(serde_json::json!(notes));
        Ok(())
    }

    async fn post(self: Arc<Self>) -> wiremount::Result<()> {
        let note: NewNote = self.base.ctx().json()?;
        let count = self.store.with(|notes| {
            notes.push(note.text);
            notes.len()
        });
        self.base.ctx().set_status(StatusCode::CREATED);
        self.base.ctx().set_body(serde_json::json!({ "count": count }));
        Ok(())
    }

    async fn delete(self: Arc<Self>) -> wiremount::Result<()> {
        self.store.with(Vec::clear);
        Ok(())
    }
}

impl CrudController for NotesController {
    fn crud() -> Crud<Self> {
        Crud::new()
            .get(NotesController::get)
            .post(NotesController::post)
            .delete(NotesController::delete)
    }
}

/// Mounts the notes CRUD controller at `/notes`
pub struct NotesPlugin;

#[async_trait]
impl Plugin for NotesPlugin {
    fn name(&self) -> &'static str {
        "notes"
    }

    async fn setup(&self, setup: &mut SetupHelper) -> wiremount::Result<()> {
        setup.assert_module_exists(wiremount::app::ROUTER_MODULE)?;
        let added = crud_controller::<NotesController>(
            setup.router_mut()?,
            "/notes",
            vec![Arc::new(LoggingMiddleware) as Arc<dyn Middleware>],
        )?;
        setup.debug(format_args!("{} crud routes", added));
        Ok(())
    }
}
