//! GTK rendering of the panel screens.

mod dialogs;

pub use dialogs::GtkPrompter;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gtk4::gdk::Display;
use gtk4::glib::{self, Propagation};
use gtk4::prelude::*;
use gtk4::{
    Align, ApplicationWindow, Box as GtkBox, Button, CssProvider, Image, Label, ListBox,
    ListBoxRow, Orientation, Stack, Switch,
};
use netpanel::views::list::{CONNECTING_LABEL, EDIT_LABEL, SCANNING_PLACEHOLDER};
use netpanel::views::NetworkRow;
use netpanel::{
    ConnectionManager, NetworkingController, PanelIntent, Screen, SettingsStore, SharedController,
};

pub type Controller =
    NetworkingController<Box<dyn ConnectionManager>, Box<dyn SettingsStore>, GtkPrompter>;

type Shared = SharedController<Box<dyn ConnectionManager>, Box<dyn SettingsStore>, GtkPrompter>;

const SIGNAL_PUMP_INTERVAL: Duration = Duration::from_millis(200);

const PAGE_LIST: &str = "list";
const PAGE_DETAIL: &str = "detail";
const PAGE_ADVANCED: &str = "advanced";

struct DetailWidgets {
    ssid: Label,
    state: Label,
    signal: Label,
    security: Label,
    connect: Button,
    forget: Button,
    back: Button,
}

struct AdvancedWidgets {
    tethering: Switch,
    tethering_password: Button,
    roaming: Switch,
    apn: Label,
    edit_apn: Button,
    ipv4_address: Label,
    back: Button,
}

struct ListWidgets {
    list: ListBox,
    placeholder: Label,
    advanced: Button,
}

pub struct Panel {
    controller: Shared,
    stack: Stack,
    list: ListWidgets,
    detail: DetailWidgets,
    advanced: AdvancedWidgets,
    /// Set while widgets are being updated from the controller, so switch
    /// handlers do not feed the update back as user input.
    rendering: Cell<bool>,
}

impl Panel {
    pub fn new(window: &ApplicationWindow, controller: Controller) -> Rc<Self> {
        let stack = Stack::new();
        stack.add_css_class("netpanel-panel");

        let (list_page, list) = build_list_page(controller.show_advanced());
        let (detail_page, detail) = build_detail_page();
        let (advanced_page, advanced) = build_advanced_page();
        stack.add_named(&list_page, Some(PAGE_LIST));
        stack.add_named(&detail_page, Some(PAGE_DETAIL));
        stack.add_named(&advanced_page, Some(PAGE_ADVANCED));

        window.set_child(Some(&stack));

        let panel = Rc::new(Self {
            controller: SharedController::new(controller),
            stack,
            list,
            detail,
            advanced,
            rendering: Cell::new(false),
        });
        panel.wire_actions();

        let pump = panel.clone();
        glib::timeout_add_local(SIGNAL_PUMP_INTERVAL, move || {
            pump.pump();
            glib::ControlFlow::Continue
        });

        panel
    }

    /// Applied once any open dialog has closed.
    pub fn activate(self: &Rc<Self>) {
        if self.controller.set_visible(true) {
            self.render();
        }
    }

    pub fn deactivate(&self) {
        self.controller.set_visible(false);
    }

    fn dispatch(self: &Rc<Self>, intent: PanelIntent) {
        if self.rendering.get() {
            return;
        }
        if self.controller.dispatch(intent) {
            self.render();
        }
    }

    /// Signals and show/hide stay queued while a dialog holds the controller.
    fn pump(self: &Rc<Self>) {
        if self.controller.pump() {
            self.render();
        }
    }

    fn wire_actions(self: &Rc<Self>) {
        let panel = self.clone();
        self.list
            .advanced
            .connect_clicked(move |_| panel.dispatch(PanelIntent::OpenAdvanced));

        for back in [&self.detail.back, &self.advanced.back] {
            let panel = self.clone();
            back.connect_clicked(move |_| panel.dispatch(PanelIntent::Back));
        }

        let panel = self.clone();
        self.detail
            .connect
            .connect_clicked(move |_| panel.dispatch(PanelIntent::DetailConnect));
        let panel = self.clone();
        self.detail
            .forget
            .connect_clicked(move |_| panel.dispatch(PanelIntent::DetailForget));

        let panel = self.clone();
        self.advanced.tethering.connect_state_set(move |_, state| {
            panel.dispatch(PanelIntent::ToggleTethering(state));
            Propagation::Proceed
        });
        let panel = self.clone();
        self.advanced
            .tethering_password
            .connect_clicked(move |_| panel.dispatch(PanelIntent::EditTetheringPassword));
        let panel = self.clone();
        self.advanced.roaming.connect_state_set(move |_, state| {
            panel.dispatch(PanelIntent::ToggleRoaming(state));
            Propagation::Proceed
        });
        let panel = self.clone();
        self.advanced
            .edit_apn
            .connect_clicked(move |_| panel.dispatch(PanelIntent::EditApn));
    }

    fn render(self: &Rc<Self>) {
        let Some(controller) = self.controller.try_borrow() else {
            return;
        };
        self.rendering.set(true);

        let page = match controller.screen() {
            Screen::NetworkList => PAGE_LIST,
            Screen::NetworkDetail(_) => PAGE_DETAIL,
            Screen::Advanced => PAGE_ADVANCED,
        };
        self.stack.set_visible_child_name(page);

        self.populate_network_list(controller.list().rows());

        if let Some(fields) = controller.detail().fields() {
            self.detail.ssid.set_text(&fields.ssid);
            self.detail.state.set_text(fields.state);
            self.detail.signal.set_text(fields.signal);
            self.detail.security.set_text(fields.security);
            self.detail.connect.set_sensitive(fields.connect_enabled);
            self.detail.forget.set_sensitive(fields.forget_enabled);
        }

        let advanced = controller.advanced();
        self.advanced.tethering.set_active(advanced.tethering_enabled());
        self.advanced
            .tethering
            .set_sensitive(advanced.tethering_toggle_enabled());
        self.advanced.roaming.set_active(advanced.roaming_enabled());
        let apn = advanced.apn();
        self.advanced
            .apn
            .set_text(if apn.is_empty() { "Automatic" } else { &apn });
        self.advanced.ipv4_address.set_text(advanced.ipv4_address());

        self.rendering.set(false);
    }

    fn populate_network_list(self: &Rc<Self>, rows: &[NetworkRow]) {
        let list = &self.list.list;
        while let Some(child) = list.first_child() {
            list.remove(&child);
        }

        self.list.placeholder.set_visible(rows.is_empty());
        list.set_visible(!rows.is_empty());
        for row in rows {
            list.append(&self.build_network_row(row));
        }
    }

    fn build_network_row(self: &Rc<Self>, row: &NetworkRow) -> ListBoxRow {
        let list_row = ListBoxRow::new();
        list_row.add_css_class("netpanel-row");
        list_row.set_activatable(false);
        list_row.set_sensitive(row.enabled);

        let container = GtkBox::new(Orientation::Horizontal, 8);
        container.set_margin_top(8);
        container.set_margin_bottom(8);
        container.set_margin_start(12);
        container.set_margin_end(12);

        let signal = Image::from_icon_name(row.signal.icon_name());
        signal.add_css_class("netpanel-network-icon");
        container.append(&signal);

        let label = Label::new(Some(&row.label));
        label.set_halign(Align::Start);
        label.add_css_class("netpanel-network-name");
        if row.emphasized {
            label.add_css_class("netpanel-emphasized");
        }
        let name = Button::new();
        name.set_child(Some(&label));
        name.add_css_class("flat");
        name.set_hexpand(true);
        name.set_sensitive(row.clickable);
        let panel = self.clone();
        let ssid = row.network.ssid.clone();
        name.connect_clicked(move |_| panel.dispatch(PanelIntent::Connect(ssid.clone())));
        container.append(&name);

        if row.connecting {
            let connecting = Label::new(Some(CONNECTING_LABEL));
            connecting.add_css_class("netpanel-connecting");
            container.append(&connecting);
        }

        if row.editable {
            let edit = Button::with_label(EDIT_LABEL);
            edit.add_css_class("netpanel-secondary");
            let panel = self.clone();
            let ssid = row.network.ssid.clone();
            edit.connect_clicked(move |_| panel.dispatch(PanelIntent::View(ssid.clone())));
            container.append(&edit);
        }

        let status = Image::new();
        status.set_pixel_size(16);
        status.set_size_request(16, 16);
        if let Some(icon) = row.status.icon_name() {
            status.set_icon_name(Some(icon));
        }
        container.append(&status);

        list_row.set_child(Some(&container));
        list_row
    }
}

fn page() -> GtkBox {
    let page = GtkBox::new(Orientation::Vertical, 12);
    page.set_margin_top(12);
    page.set_margin_bottom(12);
    page.set_margin_start(12);
    page.set_margin_end(12);
    page
}

fn header(title: &str, back: Option<&Button>) -> GtkBox {
    let header = GtkBox::new(Orientation::Horizontal, 10);
    header.add_css_class("netpanel-header");
    if let Some(back) = back {
        header.append(back);
    }
    let title = Label::new(Some(title));
    title.add_css_class("netpanel-title");
    title.set_halign(Align::Start);
    title.set_hexpand(true);
    header.append(&title);
    header
}

fn back_button() -> Button {
    let back = Button::builder().icon_name("go-previous-symbolic").build();
    back.add_css_class("netpanel-icon-button");
    back
}

/// A "caption: value" line. Returns the value label.
fn field_row(parent: &GtkBox, caption: &str) -> Label {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    let caption = Label::new(Some(caption));
    caption.add_css_class("netpanel-caption");
    caption.set_halign(Align::Start);
    caption.set_hexpand(true);
    let value = Label::new(None);
    value.set_halign(Align::End);
    row.append(&caption);
    row.append(&value);
    parent.append(&row);
    value
}

fn switch_row(parent: &GtkBox, caption: &str) -> Switch {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    let caption = Label::new(Some(caption));
    caption.set_halign(Align::Start);
    caption.set_hexpand(true);
    let switch = Switch::new();
    switch.set_valign(Align::Center);
    row.append(&caption);
    row.append(&switch);
    parent.append(&row);
    switch
}

fn build_list_page(show_advanced: bool) -> (GtkBox, ListWidgets) {
    let page = page();

    let header = header("Wi-Fi", None);
    let advanced = Button::with_label("Advanced");
    advanced.add_css_class("netpanel-secondary");
    advanced.set_visible(show_advanced);
    header.append(&advanced);

    let placeholder = Label::new(Some(SCANNING_PLACEHOLDER));
    placeholder.add_css_class("netpanel-placeholder");
    placeholder.set_vexpand(true);

    let list = ListBox::new();
    list.add_css_class("netpanel-list");
    list.set_selection_mode(gtk4::SelectionMode::None);
    list.set_show_separators(false);

    page.append(&header);
    page.append(&placeholder);
    page.append(&list);

    (
        page,
        ListWidgets {
            list,
            placeholder,
            advanced,
        },
    )
}

fn build_detail_page() -> (GtkBox, DetailWidgets) {
    let page = page();
    let back = back_button();
    page.append(&header("Network", Some(&back)));

    let ssid = Label::new(None);
    ssid.add_css_class("netpanel-title");
    ssid.set_halign(Align::Start);
    page.append(&ssid);

    let state = field_row(&page, "Status");
    let signal = field_row(&page, "Signal");
    let security = field_row(&page, "Security");

    let spacer = GtkBox::new(Orientation::Vertical, 0);
    spacer.set_vexpand(true);
    page.append(&spacer);

    let connect = Button::with_label("Connect");
    connect.add_css_class("netpanel-primary");
    let forget = Button::with_label("Forget");
    forget.add_css_class("netpanel-destructive");
    page.append(&connect);
    page.append(&forget);

    (
        page,
        DetailWidgets {
            ssid,
            state,
            signal,
            security,
            connect,
            forget,
            back,
        },
    )
}

fn build_advanced_page() -> (GtkBox, AdvancedWidgets) {
    let page = page();
    let back = back_button();
    page.append(&header("Advanced", Some(&back)));

    let tethering = switch_row(&page, "Enable Tethering");
    let tethering_password = Button::with_label("Edit tethering password");
    tethering_password.add_css_class("netpanel-secondary");
    page.append(&tethering_password);

    let ipv4_address = field_row(&page, "IP Address");

    let roaming = switch_row(&page, "Enable Roaming");
    let apn = field_row(&page, "APN Setting");
    let edit_apn = Button::with_label("Edit APN");
    edit_apn.add_css_class("netpanel-secondary");
    page.append(&edit_apn);

    (
        page,
        AdvancedWidgets {
            tethering,
            tethering_password,
            roaming,
            apn,
            edit_apn,
            ipv4_address,
            back,
        },
    )
}

pub fn load_css() {
    let css = r#"
    .netpanel-window {
        background: #2b2b2b;
        color: #e6e6e6;
        font-family: "Inter", "Noto Sans", sans-serif;
    }

    .netpanel-panel {
        background: #2f2f2f;
    }

    .netpanel-header {
        padding: 6px 4px;
    }

    .netpanel-title {
        font-weight: 700;
        font-size: 16px;
    }

    .netpanel-list {
        background: transparent;
    }

    .netpanel-row {
        background: #333333;
        border-radius: 12px;
        margin-bottom: 8px;
    }

    .netpanel-network-name {
        font-weight: 400;
    }

    .netpanel-emphasized {
        font-weight: 700;
    }

    .netpanel-connecting {
        color: #a0a0a0;
        font-size: 11px;
    }

    .netpanel-caption {
        color: #a0a0a0;
    }

    .netpanel-placeholder {
        color: #a0a0a0;
    }

    .netpanel-primary {
        background: #2f7ae5;
        color: #ffffff;
        border-radius: 10px;
        padding: 6px 10px;
    }

    .netpanel-secondary {
        background: #3a3a3a;
        color: #cfcfcf;
        border-radius: 10px;
        padding: 6px 10px;
    }

    .netpanel-destructive {
        background: #c0392b;
        color: #ffffff;
        border-radius: 10px;
        padding: 6px 10px;
    }

    .netpanel-icon-button {
        background: transparent;
        border-radius: 10px;
    }

    .netpanel-dialog-title {
        font-weight: 700;
    }

    .netpanel-dialog-subtitle {
        color: #a0a0a0;
    }
    "#;

    let provider = CssProvider::new();
    provider.load_from_data(css);

    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
