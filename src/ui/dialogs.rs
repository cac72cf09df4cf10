//! Modal dialogs behind [`Prompter`].
//!
//! Each call spins a nested main loop until the dialog is answered, so the
//! controller sees an ordinary blocking call.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::glib::{self, Propagation};
use gtk4::prelude::*;
use gtk4::{Align, ApplicationWindow, Box as GtkBox, Button, Entry, Label, Orientation, Window};
use netpanel::{Prompter, TextPrompt};

pub struct GtkPrompter {
    parent: ApplicationWindow,
}

impl GtkPrompter {
    pub fn new(parent: &ApplicationWindow) -> Self {
        Self {
            parent: parent.clone(),
        }
    }

    fn dialog(&self, title: &str) -> Window {
        let dialog = Window::builder()
            .transient_for(&self.parent)
            .modal(true)
            .resizable(false)
            .title(title)
            .default_width(320)
            .build();
        dialog.add_css_class("netpanel-dialog");
        dialog
    }
}

impl Prompter for GtkPrompter {
    fn text(&mut self, prompt: &TextPrompt) -> Option<String> {
        let dialog = self.dialog(&prompt.title);
        let answer: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let main_loop = glib::MainLoop::new(None, false);

        let content = dialog_content();

        let title = Label::new(Some(&prompt.title));
        title.add_css_class("netpanel-dialog-title");
        title.set_halign(Align::Start);
        content.append(&title);

        if !prompt.subtitle.is_empty() {
            let subtitle = Label::new(Some(&prompt.subtitle));
            subtitle.add_css_class("netpanel-dialog-subtitle");
            subtitle.set_halign(Align::Start);
            content.append(&subtitle);
        }

        let entry = Entry::new();
        entry.set_visibility(!prompt.masked);
        entry.set_text(&prompt.seed);
        entry.add_css_class("netpanel-entry");
        content.append(&entry);

        let (buttons, cancel, ok) = dialog_buttons("OK");
        ok.set_sensitive(prompt.accepts(&prompt.seed));
        content.append(&buttons);

        let ok_changed = ok.clone();
        let accepts = prompt.clone();
        entry.connect_changed(move |entry| {
            ok_changed.set_sensitive(accepts.accepts(&entry.text()));
        });

        let ok_activate = ok.clone();
        entry.connect_activate(move |_| {
            if ok_activate.is_sensitive() {
                ok_activate.emit_clicked();
            }
        });

        let answer_ok = answer.clone();
        let entry_ok = entry.clone();
        let loop_ok = main_loop.clone();
        ok.connect_clicked(move |_| {
            *answer_ok.borrow_mut() = Some(entry_ok.text().to_string());
            loop_ok.quit();
        });

        let loop_cancel = main_loop.clone();
        cancel.connect_clicked(move |_| loop_cancel.quit());

        let loop_close = main_loop.clone();
        dialog.connect_close_request(move |_| {
            loop_close.quit();
            Propagation::Proceed
        });

        dialog.set_child(Some(&content));
        dialog.present();
        entry.grab_focus();
        main_loop.run();
        dialog.destroy();

        answer.take()
    }

    fn confirm(&mut self, message: &str) -> bool {
        let dialog = self.dialog(message);
        let confirmed = Rc::new(RefCell::new(false));
        let main_loop = glib::MainLoop::new(None, false);

        let content = dialog_content();
        let label = Label::new(Some(message));
        label.add_css_class("netpanel-dialog-title");
        label.set_wrap(true);
        label.set_halign(Align::Start);
        content.append(&label);

        let (buttons, cancel, ok) = dialog_buttons("OK");
        content.append(&buttons);

        let confirmed_ok = confirmed.clone();
        let loop_ok = main_loop.clone();
        ok.connect_clicked(move |_| {
            *confirmed_ok.borrow_mut() = true;
            loop_ok.quit();
        });

        let loop_cancel = main_loop.clone();
        cancel.connect_clicked(move |_| loop_cancel.quit());

        let loop_close = main_loop.clone();
        dialog.connect_close_request(move |_| {
            loop_close.quit();
            Propagation::Proceed
        });

        dialog.set_child(Some(&content));
        dialog.present();
        main_loop.run();
        dialog.destroy();

        confirmed.take()
    }
}

fn dialog_content() -> GtkBox {
    let content = GtkBox::new(Orientation::Vertical, 12);
    content.set_margin_top(16);
    content.set_margin_bottom(16);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content
}

fn dialog_buttons(confirm_label: &str) -> (GtkBox, Button, Button) {
    let buttons = GtkBox::new(Orientation::Horizontal, 8);
    buttons.set_halign(Align::End);

    let cancel = Button::with_label("Cancel");
    cancel.add_css_class("netpanel-secondary");

    let ok = Button::with_label(confirm_label);
    ok.add_css_class("netpanel-primary");

    buttons.append(&cancel);
    buttons.append(&ok);
    (buttons, cancel, ok)
}
