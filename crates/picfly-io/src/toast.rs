use std::thread;

use kanal::Sender;
use windows::Data::Xml::Dom::XmlDocument;
use windows::UI::Notifications::{ToastNotification, ToastNotificationManager};
use windows::core::HSTRING;

use crate::IoError;
use crate::com::ComGuard;
use crate::notify::{Notification, NotificationSink};

/// WinRT toast notifications, shown from a dedicated COM thread.
pub struct ToastNotifier {
    queue: Sender<Notification>,
}

impl ToastNotifier {
    pub fn spawn(app_id: String) -> Result<Self, IoError> {
        let (tx, rx) = kanal::bounded::<Notification>(16);

        thread::Builder::new()
            .name("picfly-toast".into())
            .spawn(move || {
                let _com = match ComGuard::initialize() {
                    Ok(guard) => guard,
                    Err(e) => {
                        tracing::error!("{e}");
                        return;
                    }
                };
                while let Ok(notification) = rx.recv() {
                    if let Err(e) = show(&app_id, &notification) {
                        tracing::warn!(title = %notification.title, "toast failed: {e}");
                    }
                }
            })?;

        Ok(Self { queue: tx })
    }
}

impl NotificationSink for ToastNotifier {
    fn notify(&self, notification: Notification) {
        let notification = notification.truncated();
        match self.queue.try_send(notification) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("notification queue full, dropping"),
            Err(e) => tracing::warn!("notification thread gone: {e}"),
        }
    }
}

fn show(app_id: &str, notification: &Notification) -> windows::core::Result<()> {
    let xml = toast_document(notification)?;
    let toast = ToastNotification::CreateToastNotification(&xml)?;
    ToastNotificationManager::CreateToastNotifierWithId(&HSTRING::from(app_id))?.Show(&toast)
}

/// `<toast><visual><binding template="ToastGeneric">` with a title and a body line.
///
/// Text goes in as DOM text nodes so the document does the escaping.
fn toast_document(notification: &Notification) -> windows::core::Result<XmlDocument> {
    let xml = XmlDocument::new()?;
    let toast = xml.CreateElement(&HSTRING::from("toast"))?;
    let visual = xml.CreateElement(&HSTRING::from("visual"))?;
    let binding = xml.CreateElement(&HSTRING::from("binding"))?;
    binding.SetAttribute(&HSTRING::from("template"), &HSTRING::from("ToastGeneric"))?;

    for line in [&notification.title, &notification.message] {
        let text = xml.CreateElement(&HSTRING::from("text"))?;
        text.AppendChild(&xml.CreateTextNode(&HSTRING::from(line.as_str()))?)?;
        binding.AppendChild(&text)?;
    }

    visual.AppendChild(&binding)?;
    toast.AppendChild(&visual)?;
    xml.AppendChild(&toast)?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_in_messages_stays_text() {
        let notification = Notification::error("a<b", "x & \"y\" </text><image/>");
        let xml = toast_document(&notification).unwrap();

        let texts = xml.GetElementsByTagName(&HSTRING::from("text")).unwrap();
        assert_eq!(texts.Length().unwrap(), 2);
        assert_eq!(texts.Item(0).unwrap().InnerText().unwrap().to_string(), "a<b");
        assert_eq!(
            texts.Item(1).unwrap().InnerText().unwrap().to_string(),
            "x & \"y\" </text><image/>"
        );
        assert_eq!(
            xml.GetElementsByTagName(&HSTRING::from("image"))
                .unwrap()
                .Length()
                .unwrap(),
            0
        );

        let serialized = xml.GetXml().unwrap().to_string();
        assert!(serialized.contains("a&lt;b"));
        assert!(serialized.contains(r#"template="ToastGeneric""#));
    }
}
